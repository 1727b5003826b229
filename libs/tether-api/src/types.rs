use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::diag::Diagnostics;
use crate::error::ValueError;
use crate::path::Path;
use crate::value::{ObjectValue, Value};

/// Declared type of a dynamic value.
///
/// Closed on purpose: converters match on it exhaustively.
///
/// Serialized externally tagged, e.g. `"string"`, `{"list": "number"}`,
/// `{"object": {"attributes": {"name": "string"}}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Bool,
    Number,
    String,
    List(Box<Type>),
    Set(Box<Type>),
    Map(Box<Type>),
    Object(ObjectType),
}

impl Type {
    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    pub fn set(element: Type) -> Self {
        Type::Set(Box::new(element))
    }

    pub fn map(element: Type) -> Self {
        Type::Map(Box::new(element))
    }

    /// Shortcut for an object type without a validation hook.
    pub fn object<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Type)>,
        K: Into<String>,
    {
        Type::Object(ObjectType::from_attributes(attributes))
    }

    /// Attribute type directory, present only for object types.
    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Type::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => f.write_str("bool"),
            Type::Number => f.write_str("number"),
            Type::String => f.write_str("string"),
            Type::List(element) => write!(f, "list[{element}]"),
            Type::Set(element) => write!(f, "set[{element}]"),
            Type::Map(element) => write!(f, "map[{element}]"),
            Type::Object(object) => write!(f, "{object}"),
        }
    }
}

/// Schema-level validation hook for object values.
///
/// Runs on the assembled object after every attribute converted and before
/// the object type re-wraps it. Implemented for plain closures.
pub trait Validate: Send + Sync {
    fn validate(&self, ctx: &Context, value: &Value, path: &Path) -> Diagnostics;
}

impl<F> Validate for F
where
    F: Fn(&Context, &Value, &Path) -> Diagnostics + Send + Sync,
{
    fn validate(&self, ctx: &Context, value: &Value, path: &Path) -> Diagnostics {
        self(ctx, value, path)
    }
}

/// Object type: the attribute type directory plus an optional validation hook.
///
/// Equality and serialization only consider the attribute types.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ObjectType {
    #[serde(rename = "attributes")]
    attribute_types: BTreeMap<String, Type>,
    #[serde(skip)]
    validator: Option<Arc<dyn Validate>>,
}

impl ObjectType {
    pub fn new(attribute_types: BTreeMap<String, Type>) -> Self {
        Self {
            attribute_types,
            validator: None,
        }
    }

    pub fn from_attributes<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Type)>,
        K: Into<String>,
    {
        Self::new(
            attributes
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        )
    }

    pub fn with_validator(mut self, validator: impl Validate + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn attribute_types(&self) -> &BTreeMap<String, Type> {
        &self.attribute_types
    }

    pub fn attribute_type(&self, name: &str) -> Option<&Type> {
        self.attribute_types.get(name)
    }

    pub fn validator(&self) -> Option<&dyn Validate> {
        self.validator.as_deref()
    }

    /// Same object type (hooks included) over a new attribute directory.
    pub fn with_attribute_types(&self, attribute_types: BTreeMap<String, Type>) -> Self {
        Self {
            attribute_types,
            validator: self.validator.clone(),
        }
    }

    /// Re-wrap a canonical value as a value of this type.
    ///
    /// Objects must carry exactly this attribute directory; null and unknown
    /// pass through.
    pub fn value_from_wire(&self, ctx: &Context, value: Value) -> Result<Value, ValueError> {
        if ctx.is_cancelled() {
            return Err(ValueError::Cancelled);
        }
        match value {
            Value::Null | Value::Unknown => Ok(value),
            Value::Object(object) if object.object_type() == self => {
                let attributes = object.into_attributes();
                Ok(Value::Object(ObjectValue::new(self.clone(), attributes)?))
            }
            other => Err(ValueError::TypeMismatch {
                expected: self.to_string(),
                found: other.kind(),
            }),
        }
    }
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.attribute_types == other.attribute_types
    }
}

impl Eq for ObjectType {}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectType")
            .field("attribute_types", &self.attribute_types)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("object{")?;
        for (i, (name, ty)) in self.attribute_types.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {ty}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_readable() {
        let ty = Type::object([
            ("name", Type::String),
            ("tags", Type::map(Type::String)),
            ("ports", Type::set(Type::Number)),
        ]);
        assert_eq!(
            ty.to_string(),
            "object{name: string, ports: set[number], tags: map[string]}"
        );
    }

    #[test]
    fn equality_ignores_validator() {
        let plain = ObjectType::from_attributes([("a", Type::Bool)]);
        let hooked = plain
            .clone()
            .with_validator(|_: &Context, _: &Value, _: &Path| Diagnostics::new());
        assert_eq!(plain, hooked);
        assert!(hooked.validator().is_some());
        assert!(hooked.with_attribute_types(BTreeMap::new()).validator().is_some());
    }

    #[test]
    fn deserializes_from_json() {
        let ty: Type = serde_json::from_value(serde_json::json!({
            "object": { "attributes": { "name": "string", "ids": { "list": "number" } } }
        }))
        .unwrap();
        assert_eq!(
            ty,
            Type::object([("name", Type::String), ("ids", Type::list(Type::Number))])
        );
    }

    #[test]
    fn rewraps_matching_objects_only() {
        let ctx = Context::default();
        let ty = ObjectType::from_attributes([("a", Type::Bool)]);
        let object = ObjectValue::new(
            ty.clone(),
            BTreeMap::from([("a".to_string(), Value::Bool(true))]),
        )
        .unwrap();

        let ok = ty.value_from_wire(&ctx, Value::Object(object.clone())).unwrap();
        assert_eq!(ok, Value::Object(object));

        let other = ObjectType::from_attributes([("b", Type::Bool)]);
        let value = ty.value_from_wire(&ctx, Value::Null).unwrap();
        assert_eq!(value, Value::Null);
        assert!(other.value_from_wire(&ctx, ok).is_err());
        assert!(ty.value_from_wire(&ctx, Value::Bool(true)).is_err());
    }
}
