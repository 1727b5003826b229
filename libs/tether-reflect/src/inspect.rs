use std::collections::BTreeMap;

use tether_api::{Value, ValueError};

/// Attribute name -> value of an object-shaped value.
pub fn object_fields(value: &Value) -> Result<&BTreeMap<String, Value>, ValueError> {
    match value {
        Value::Object(object) => Ok(object.attributes()),
        other => Err(ValueError::TypeMismatch {
            expected: "object".to_string(),
            found: other.kind(),
        }),
    }
}
