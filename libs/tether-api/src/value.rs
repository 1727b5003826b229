use std::collections::BTreeMap;

use crate::context::Context;
use crate::error::ValueError;
use crate::types::{ObjectType, Type};

pub use serde_json::Number;

/// Dynamic value, in canonical (wire) form.
///
/// `Null` and `Unknown` conform to every [`Type`]; all other variants
/// conform only to their matching type.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    /// Not yet known; decided later by the external system.
    Unknown,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    /// Elements are unique. Build through [`Value::set`] to enforce it.
    Set(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(ObjectValue),
}

impl Value {
    /// Set value, rejecting duplicate elements.
    pub fn set(elements: Vec<Value>) -> Result<Self, ValueError> {
        check_unique(&elements)?;
        Ok(Value::Set(elements))
    }

    /// Object value; see [`ObjectValue::new`].
    pub fn object(
        object_type: ObjectType,
        attributes: BTreeMap<String, Value>,
    ) -> Result<Self, ValueError> {
        ObjectValue::new(object_type, attributes).map(Value::Object)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Unknown => "unknown",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Whether this value can be a value of `ty`.
    pub fn conforms_to(&self, ty: &Type) -> bool {
        match (self, ty) {
            (Value::Null | Value::Unknown, _) => true,
            (Value::Bool(_), Type::Bool)
            | (Value::Number(_), Type::Number)
            | (Value::String(_), Type::String) => true,
            (Value::List(items), Type::List(element)) | (Value::Set(items), Type::Set(element)) => {
                items.iter().all(|item| item.conforms_to(element))
            }
            (Value::Map(entries), Type::Map(element)) => {
                entries.values().all(|entry| entry.conforms_to(element))
            }
            // attribute conformance is checked by `ObjectValue::new`
            (Value::Object(object), Type::Object(object_type)) => {
                object.object_type() == object_type
            }
            _ => false,
        }
    }

    /// Canonical wire form of this value.
    pub fn to_wire(&self, ctx: &Context) -> Result<Value, ValueError> {
        if ctx.is_cancelled() {
            return Err(ValueError::Cancelled);
        }
        if let Value::Set(elements) = self {
            check_unique(elements)?;
        }
        Ok(self.clone())
    }

    /// Build a value of `ty` from plain JSON.
    ///
    /// JSON has no unknown; `null` maps to [`Value::Null`] at any depth.
    pub fn from_json(ty: &Type, json: &serde_json::Value) -> Result<Value, ValueError> {
        use serde_json::Value as Json;

        match (ty, json) {
            (_, Json::Null) => Ok(Value::Null),
            (Type::Bool, Json::Bool(b)) => Ok(Value::Bool(*b)),
            (Type::Number, Json::Number(n)) => Ok(Value::Number(n.clone())),
            (Type::String, Json::String(s)) => Ok(Value::String(s.clone())),
            (Type::List(element), Json::Array(items)) => items
                .iter()
                .map(|item| Value::from_json(element, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            (Type::Set(element), Json::Array(items)) => {
                let elements = items
                    .iter()
                    .map(|item| Value::from_json(element, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Value::set(elements)
            }
            (Type::Map(element), Json::Object(entries)) => entries
                .iter()
                .map(|(key, entry)| -> Result<(String, Value), ValueError> {
                    Ok((key.clone(), Value::from_json(element, entry)?))
                })
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(Value::Map),
            (Type::Object(object_type), Json::Object(entries)) => {
                let mut attributes = BTreeMap::new();
                for (name, entry) in entries {
                    let Some(attribute_type) = object_type.attribute_type(name) else {
                        return Err(ValueError::AttributeMismatch {
                            missing: Vec::new(),
                            unexpected: vec![name.clone()],
                        });
                    };
                    attributes.insert(name.clone(), Value::from_json(attribute_type, entry)?);
                }
                Value::object(object_type.clone(), attributes)
            }
            (ty, json) => Err(ValueError::TypeMismatch {
                expected: ty.to_string(),
                found: json_kind(json),
            }),
        }
    }

    /// Plain JSON rendering. Fails on [`Value::Unknown`].
    pub fn to_json(&self) -> Result<serde_json::Value, ValueError> {
        use serde_json::Value as Json;

        Ok(match self {
            Value::Null => Json::Null,
            Value::Unknown => return Err(ValueError::UnknownNotRepresentable),
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => Json::Number(n.clone()),
            Value::String(s) => Json::String(s.clone()),
            Value::List(items) | Value::Set(items) => Json::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Map(entries) => Json::Object(json_entries(entries)?),
            Value::Object(object) => Json::Object(json_entries(object.attributes())?),
        })
    }
}

/// Object value. Its attribute names always equal its type's attribute names.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    object_type: ObjectType,
    attributes: BTreeMap<String, Value>,
}

impl ObjectValue {
    /// Fails unless `attributes` has exactly the type's attribute names and
    /// every attribute conforms to its declared type.
    pub fn new(
        object_type: ObjectType,
        attributes: BTreeMap<String, Value>,
    ) -> Result<Self, ValueError> {
        let declared = object_type.attribute_types();
        let missing: Vec<String> = declared
            .keys()
            .filter(|name| !attributes.contains_key(*name))
            .cloned()
            .collect();
        let unexpected: Vec<String> = attributes
            .keys()
            .filter(|name| !declared.contains_key(*name))
            .cloned()
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(ValueError::AttributeMismatch { missing, unexpected });
        }

        // same key set, both sorted
        for ((name, value), ty) in attributes.iter().zip(declared.values()) {
            if !value.conforms_to(ty) {
                return Err(ValueError::AttributeType {
                    name: name.clone(),
                    expected: ty.to_string(),
                    found: value.kind(),
                });
            }
        }

        Ok(Self {
            object_type,
            attributes,
        })
    }

    pub fn object_type(&self) -> &ObjectType {
        &self.object_type
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn into_attributes(self) -> BTreeMap<String, Value> {
        self.attributes
    }
}

fn check_unique(elements: &[Value]) -> Result<(), ValueError> {
    for (i, element) in elements.iter().enumerate() {
        if elements[..i].contains(element) {
            return Err(ValueError::DuplicateSetElement(i));
        }
    }
    Ok(())
}

fn json_entries(
    entries: &BTreeMap<String, Value>,
) -> Result<serde_json::Map<String, serde_json::Value>, ValueError> {
    entries
        .iter()
        .map(|(key, value)| -> Result<(String, serde_json::Value), ValueError> {
            Ok((key.clone(), value.to_json()?))
        })
        .collect()
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn person() -> ObjectType {
        ObjectType::from_attributes([("name", Type::String), ("age", Type::Number)])
    }

    #[test]
    fn default_is_null() {
        assert_eq!(Value::default(), Value::Null);
    }

    #[test]
    fn object_requires_exact_attribute_set() {
        let err = ObjectValue::new(
            person(),
            BTreeMap::from([
                ("name".to_string(), Value::String("Ana".into())),
                ("extra".to_string(), Value::Bool(true)),
            ]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValueError::AttributeMismatch {
                missing: vec!["age".into()],
                unexpected: vec!["extra".into()],
            }
        );
    }

    #[test]
    fn object_checks_attribute_types() {
        let err = ObjectValue::new(
            person(),
            BTreeMap::from([
                ("name".to_string(), Value::Bool(true)),
                ("age".to_string(), Value::Null),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, ValueError::AttributeType { ref name, .. } if name == "name"));
    }

    #[test]
    fn sets_reject_duplicates() {
        let err = Value::set(vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)]);
        assert_eq!(err, Err(ValueError::DuplicateSetElement(2)));

        let raw = Value::Set(vec![Value::Null, Value::Null]);
        assert!(raw.to_wire(&Context::default()).is_err());
    }

    #[test]
    fn json_conversion_is_type_directed() {
        let ty = Type::Object(person());
        let value = Value::from_json(&ty, &json!({ "name": "Ana", "age": 30 })).unwrap();
        assert_eq!(value.as_object().unwrap().get("age"), Some(&Value::Number(30.into())));
        assert_eq!(value.to_json().unwrap(), json!({ "name": "Ana", "age": 30 }));

        assert!(Value::from_json(&ty, &json!({ "name": "Ana" })).is_err());
        assert!(Value::from_json(&Type::list(Type::Bool), &json!([1])).is_err());
        assert!(Value::Unknown.to_json().is_err());
    }

    #[test]
    fn null_and_unknown_conform_everywhere() {
        for ty in [Type::Bool, Type::list(Type::String), Type::Object(person())] {
            assert!(Value::Null.conforms_to(&ty));
            assert!(Value::Unknown.conforms_to(&ty));
        }
        assert!(!Value::Bool(true).conforms_to(&Type::String));
        assert!(!Value::List(vec![]).conforms_to(&Type::set(Type::String)));
    }
}
