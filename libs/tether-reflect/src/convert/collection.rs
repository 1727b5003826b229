use std::collections::{BTreeMap, HashMap};

use tether_api::{Context, Diagnostics, Path, Type, Value, ValueError};

use super::{Absent, FromValue, IntoValue};
use crate::diags;

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(
        ctx: &Context,
        ty: &Type,
        value: &Value,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            _ => T::from_value(ctx, ty, value, path, diags).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(
        &self,
        ctx: &Context,
        ty: &Type,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Value> {
        match self {
            None => Some(Value::Null),
            Some(inner) => inner.into_value(ctx, ty, path, diags),
        }
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(
        ctx: &Context,
        ty: &Type,
        value: &Value,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Self> {
        T::from_value(ctx, ty, value, path, diags).map(Box::new)
    }
}

impl<T: IntoValue> IntoValue for Box<T> {
    fn into_value(
        &self,
        ctx: &Context,
        ty: &Type,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Value> {
        self.as_ref().into_value(ctx, ty, path, diags)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(
        ctx: &Context,
        ty: &Type,
        value: &Value,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Self> {
        if !diags::enter(ctx, path, diags) {
            return None;
        }
        let target = std::any::type_name::<Self>();
        let (element_type, items) = match (ty, value) {
            (Type::List(element), Value::List(items)) | (Type::Set(element), Value::Set(items)) => {
                (element.as_ref(), items)
            }
            (Type::List(_) | Type::Set(_), Value::Null | Value::Unknown) => {
                return Absent::of(value)?.resolve(ctx, path, diags);
            }
            (Type::List(_) | Type::Set(_), other) => {
                diags.push(diags::value_shape(path, ty, other.kind(), target));
                return None;
            }
            (declared, _) => {
                diags.push(diags::declared_type(path, declared, target));
                return None;
            }
        };

        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            out.push(T::from_value(ctx, element_type, item, &path.at_index(i), diags)?);
        }
        Some(out)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(
        &self,
        ctx: &Context,
        ty: &Type,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Value> {
        if !diags::enter(ctx, path, diags) {
            return None;
        }
        let element_type = match ty {
            Type::List(element) | Type::Set(element) => element.as_ref(),
            declared => {
                diags.push(diags::declared_type(path, declared, std::any::type_name::<Self>()));
                return None;
            }
        };

        let mut items = Vec::with_capacity(self.len());
        for (i, item) in self.iter().enumerate() {
            items.push(item.into_value(ctx, element_type, &path.at_index(i), diags)?);
        }

        match ty {
            Type::Set(_) => match Value::set(items) {
                Ok(set) => Some(set),
                Err(ValueError::DuplicateSetElement(i)) => {
                    diags.push(diags::conversion(
                        &path.at_index(i),
                        "set elements must be unique",
                    ));
                    None
                }
                Err(err) => {
                    diags.push(diags::value_error(path, err));
                    None
                }
            },
            _ => Some(Value::List(items)),
        }
    }
}

/// Decode a map's entries, keyed by string.
fn entries_from_value<T: FromValue, M: FromIterator<(String, T)>>(
    ctx: &Context,
    ty: &Type,
    value: &Value,
    path: &Path,
    target: &str,
    diags: &mut Diagnostics,
) -> Option<Result<M, Absent>> {
    if !diags::enter(ctx, path, diags) {
        return None;
    }
    let (element_type, entries) = match (ty, value) {
        (Type::Map(element), Value::Map(entries)) => (element.as_ref(), entries),
        (Type::Map(_), Value::Null | Value::Unknown) => return Absent::of(value).map(Err),
        (Type::Map(_), other) => {
            diags.push(diags::value_shape(path, ty, other.kind(), target));
            return None;
        }
        (declared, _) => {
            diags.push(diags::declared_type(path, declared, target));
            return None;
        }
    };

    let mut out = Vec::with_capacity(entries.len());
    for (key, entry) in entries {
        let entry = T::from_value(ctx, element_type, entry, &path.at_key(key.as_str()), diags)?;
        out.push((key.clone(), entry));
    }
    Some(Ok(out.into_iter().collect()))
}

/// Encode `(key, value)` pairs as a map; keys come out sorted.
fn entries_into_value<'a, T: IntoValue + 'a>(
    entries: impl Iterator<Item = (&'a String, &'a T)>,
    ctx: &Context,
    ty: &Type,
    path: &Path,
    target: &str,
    diags: &mut Diagnostics,
) -> Option<Value> {
    if !diags::enter(ctx, path, diags) {
        return None;
    }
    let Type::Map(element_type) = ty else {
        diags.push(diags::declared_type(path, ty, target));
        return None;
    };

    let mut sorted: Vec<_> = entries.collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = BTreeMap::new();
    for (key, entry) in sorted {
        let value = entry.into_value(ctx, element_type, &path.at_key(key.as_str()), diags)?;
        out.insert(key.clone(), value);
    }
    Some(Value::Map(out))
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(
        ctx: &Context,
        ty: &Type,
        value: &Value,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Self> {
        let target = std::any::type_name::<Self>();
        match entries_from_value(ctx, ty, value, path, target, diags)? {
            Ok(map) => Some(map),
            Err(absent) => absent.resolve(ctx, path, diags),
        }
    }
}

impl<T: IntoValue> IntoValue for BTreeMap<String, T> {
    fn into_value(
        &self,
        ctx: &Context,
        ty: &Type,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Value> {
        entries_into_value(self.iter(), ctx, ty, path, std::any::type_name::<Self>(), diags)
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn from_value(
        ctx: &Context,
        ty: &Type,
        value: &Value,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Self> {
        let target = std::any::type_name::<Self>();
        match entries_from_value(ctx, ty, value, path, target, diags)? {
            Ok(map) => Some(map),
            Err(absent) => absent.resolve(ctx, path, diags),
        }
    }
}

impl<T: IntoValue> IntoValue for HashMap<String, T> {
    fn into_value(
        &self,
        ctx: &Context,
        ty: &Type,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Value> {
        entries_into_value(self.iter(), ctx, ty, path, std::any::type_name::<Self>(), diags)
    }
}

/// Dynamic values pass through unchanged, as long as they fit the declared type.
impl FromValue for Value {
    fn from_value(
        _ctx: &Context,
        ty: &Type,
        value: &Value,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Self> {
        if value.conforms_to(ty) {
            Some(value.clone())
        } else {
            diags.push(diags::value_shape(path, ty, value.kind(), "Value"));
            None
        }
    }
}

impl IntoValue for Value {
    fn into_value(
        &self,
        ctx: &Context,
        ty: &Type,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Value> {
        Value::from_value(ctx, ty, self, path, diags)
    }
}

#[cfg(test)]
mod tests {
    use tether_api::Number;

    use super::*;

    fn num(n: i64) -> Value {
        Value::Number(Number::from(n))
    }

    #[test]
    fn lists_report_the_failing_index() {
        let mut diags = Diagnostics::new();
        let value = Value::List(vec![num(1), Value::String("two".into()), num(3)]);
        let out = Vec::<i64>::from_value(
            &Context::default(),
            &Type::list(Type::Number),
            &value,
            &Path::root().at_name("ids"),
            &mut diags,
        );
        assert_eq!(out, None);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.iter().next().unwrap().path().to_string(), "ids[1]");
    }

    #[test]
    fn list_and_set_shapes_must_agree() {
        let mut diags = Diagnostics::new();
        let out = Vec::<i64>::from_value(
            &Context::default(),
            &Type::set(Type::Number),
            &Value::List(vec![num(1)]),
            &Path::root(),
            &mut diags,
        );
        assert_eq!(out, None);
        assert!(diags.has_error());
    }

    #[test]
    fn set_encoding_rejects_duplicates() {
        let mut diags = Diagnostics::new();
        let out = vec![1i64, 2, 1].into_value(
            &Context::default(),
            &Type::set(Type::Number),
            &Path::root().at_name("ports"),
            &mut diags,
        );
        assert_eq!(out, None);
        assert_eq!(diags.iter().next().unwrap().path().to_string(), "ports[2]");

        let mut diags = Diagnostics::new();
        let out = vec![1i64, 2].into_value(
            &Context::default(),
            &Type::set(Type::Number),
            &Path::root(),
            &mut diags,
        );
        assert_eq!(out, Some(Value::Set(vec![num(1), num(2)])));
    }

    #[test]
    fn maps_use_keyed_paths() {
        let mut entries = BTreeMap::new();
        entries.insert("env".to_string(), Value::Bool(true));
        let mut diags = Diagnostics::new();
        let out = HashMap::<String, String>::from_value(
            &Context::default(),
            &Type::map(Type::String),
            &Value::Map(entries),
            &Path::root().at_name("tags"),
            &mut diags,
        );
        assert_eq!(out, None);
        assert_eq!(diags.iter().next().unwrap().path().to_string(), r#"tags["env"]"#);
    }

    #[test]
    fn hash_maps_encode_sorted() {
        let map = HashMap::from([("b".to_string(), 2i64), ("a".to_string(), 1i64)]);
        let mut diags = Diagnostics::new();
        let out = map
            .into_value(&Context::default(), &Type::map(Type::Number), &Path::root(), &mut diags)
            .unwrap();
        let Value::Map(entries) = out else { panic!("expected a map") };
        assert_eq!(entries.keys().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn options_map_null_to_none() {
        let mut diags = Diagnostics::new();
        let out = Option::<String>::from_value(
            &Context::default(),
            &Type::String,
            &Value::Null,
            &Path::root(),
            &mut diags,
        );
        assert_eq!(out, Some(None));

        let out = None::<String>.into_value(
            &Context::default(),
            &Type::String,
            &Path::root(),
            &mut diags,
        );
        assert_eq!(out, Some(Value::Null));
        assert!(diags.is_empty());
    }

    #[test]
    fn dynamic_values_must_conform() {
        let mut diags = Diagnostics::new();
        let out = Value::from_value(
            &Context::default(),
            &Type::list(Type::String),
            &Value::List(vec![Value::String("a".into()), Value::Unknown]),
            &Path::root(),
            &mut diags,
        );
        assert!(out.is_some());

        let out = Value::Bool(true).into_value(
            &Context::default(),
            &Type::String,
            &Path::root(),
            &mut diags,
        );
        assert_eq!(out, None);
        assert!(diags.has_error());
    }
}
