use std::collections::BTreeMap;

use crate::error::MappingError;
use crate::record::{FieldTag, Record, Tag};

/// One attribute-mapped field: its attribute name and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: &'static str,
    /// Dotted Rust field path, e.g. `common.id`.
    field: String,
    index: Vec<usize>,
}

impl FieldDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Positions in [`Record::field_tags`], one per embedding level.
    pub fn index(&self) -> &[usize] {
        &self.index
    }
}

/// Attribute-mapped fields of a record, in declaration order.
///
/// Embedded records contribute their fields at the embedding point.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    list: Vec<FieldDescriptor>,
}

impl FieldMap {
    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor> {
        self.list.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.list.iter().map(|field| field.name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.list.iter().find(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// Map the fields of `T`, promoting embedded records no deeper than
/// `max_depth` levels.
///
/// Skipped fields are left out. Untagged fields, empty names and names
/// declared twice anywhere in the embedding tree are errors.
pub fn type_fields<T: Record>(max_depth: usize) -> Result<FieldMap, MappingError> {
    let mut mapper = Mapper {
        record: std::any::type_name::<T>(),
        max_depth,
        list: Vec::new(),
        owners: BTreeMap::new(),
    };
    mapper.collect(&T::field_tags(), &[], "")?;
    Ok(FieldMap { list: mapper.list })
}

struct Mapper {
    record: &'static str,
    max_depth: usize,
    list: Vec<FieldDescriptor>,
    /// attribute name -> Rust field path that declared it
    owners: BTreeMap<&'static str, String>,
}

impl Mapper {
    fn collect(
        &mut self,
        tags: &[FieldTag],
        prefix: &[usize],
        field_prefix: &str,
    ) -> Result<(), MappingError> {
        for (position, tag) in tags.iter().enumerate() {
            let field = format!("{field_prefix}{}", tag.field);
            let mut index = prefix.to_vec();
            index.push(position);

            match tag.tag {
                Tag::Skip => {}
                Tag::Untagged => {
                    return Err(MappingError::Untagged {
                        record: self.record,
                        field,
                    });
                }
                Tag::Name("") => {
                    return Err(MappingError::EmptyName {
                        record: self.record,
                        field,
                    });
                }
                Tag::Name(name) => {
                    if let Some(first) = self.owners.get(name) {
                        return Err(MappingError::DuplicateName {
                            record: self.record,
                            name: name.to_string(),
                            first: first.clone(),
                            second: field,
                        });
                    }
                    self.owners.insert(name, field.clone());
                    self.list.push(FieldDescriptor { name, field, index });
                }
                Tag::Embed(nested) => {
                    if index.len() > self.max_depth {
                        return Err(MappingError::EmbedDepth {
                            record: self.record,
                            field,
                            limit: self.max_depth,
                        });
                    }
                    let nested_prefix = format!("{field}.");
                    self.collect(&nested(), &index, &nested_prefix)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::record::FieldSlot;

    #[derive(Debug, Default, PartialEq, crate::Record)]
    struct Common {
        #[tether(name = "id")]
        id: String,
        #[tether(skip)]
        revision: u64,
    }

    #[derive(Debug, Default, PartialEq, crate::Record)]
    struct Server {
        #[tether(name = "hostname")]
        hostname: String,
        #[tether(embed)]
        common: Common,
        #[tether(name = "port")]
        port: u16,
    }

    #[test]
    fn promotes_embedded_fields_in_declaration_order() {
        let map = type_fields::<Server>(64).unwrap();
        let listed: Vec<_> = map
            .iter()
            .map(|f| (f.name(), f.field().to_string(), f.index().to_vec()))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("hostname", "hostname".to_string(), vec![0]),
                ("id", "common.id".to_string(), vec![1, 0]),
                ("port", "port".to_string(), vec![2]),
            ]
        );
        assert!(map.get("revision").is_none());
    }

    #[test]
    fn embed_depth_is_bounded() {
        let err = type_fields::<Server>(0).unwrap_err();
        assert!(matches!(
            err,
            MappingError::EmbedDepth { ref field, limit: 0, .. } if field == "common"
        ));
    }

    /// Hand-written record, to exercise tables the derive refuses to emit.
    #[derive(Default)]
    struct Manual {
        a: String,
    }

    thread_local! {
        static TAGS: RefCell<Vec<FieldTag>> = const { RefCell::new(Vec::new()) };
    }

    impl Record for Manual {
        fn field_tags() -> Vec<FieldTag> {
            TAGS.with(|tags| tags.borrow().clone())
        }

        fn slot(&self, index: &[usize]) -> Option<&dyn FieldSlot> {
            match index {
                [0] => Some(&self.a as &dyn FieldSlot),
                _ => None,
            }
        }

        fn slot_mut(&mut self, index: &[usize]) -> Option<&mut dyn FieldSlot> {
            match index {
                [0] => Some(&mut self.a as &mut dyn FieldSlot),
                _ => None,
            }
        }
    }

    fn tag(field: &'static str, tag: Tag) -> FieldTag {
        FieldTag { field, tag }
    }

    fn map_manual(tags: Vec<FieldTag>) -> Result<FieldMap, MappingError> {
        TAGS.with(|cell| *cell.borrow_mut() = tags);
        type_fields::<Manual>(64)
    }

    #[test]
    fn rejects_untagged_fields() {
        let err = map_manual(vec![tag("a", Tag::Untagged)]).unwrap_err();
        assert!(matches!(err, MappingError::Untagged { ref field, .. } if field == "a"));
    }

    #[test]
    fn rejects_empty_and_duplicate_names() {
        let err = map_manual(vec![tag("a", Tag::Name(""))]).unwrap_err();
        assert!(matches!(err, MappingError::EmptyName { .. }));

        let err = map_manual(vec![
            tag("a", Tag::Name("x")),
            tag("b", Tag::Name("x")),
        ])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "{}: attribute `x` is declared by both `a` and `b`",
                std::any::type_name::<Manual>()
            )
        );
    }

    #[test]
    fn duplicates_across_embedding_are_rejected() {
        let err = map_manual(vec![
            tag("a", Tag::Name("id")),
            tag("common", Tag::Embed(<Common as Record>::field_tags)),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            MappingError::DuplicateName { ref second, .. } if second == "common.id"
        ));
    }
}
