use std::collections::BTreeMap;

use tether_api::{Context, Diagnostics, ObjectType, ObjectValue, Path, Type, Value};

use crate::diags;
use crate::fields::type_fields;
use crate::reconcile::{Counterpart, reconcile};
use crate::record::Record;

/// Build an object value of type `ty` from `record`.
///
/// The attribute-mapped fields of the record and the attributes of `ty` must
/// match exactly. Each field converts with its declared attribute type; the
/// assembled object goes through the type's validation hook, if any, and is
/// then re-wrapped by the type itself.
///
/// Stops at the first error and returns `None`.
pub fn encode_struct<T: Record>(
    ctx: &Context,
    ty: &Type,
    record: &T,
    path: &Path,
    diags: &mut Diagnostics,
) -> Option<Value> {
    let mut local = Diagnostics::new();
    let value = encode_fields(ctx, ty, record, path, &mut local);
    if local.has_error() {
        tracing::debug!(%path, errors = local.errors().count(), "record encode aborted");
    }
    diags.append(local);
    value
}

fn encode_fields<T: Record>(
    ctx: &Context,
    ty: &Type,
    record: &T,
    path: &Path,
    diags: &mut Diagnostics,
) -> Option<Value> {
    let source = std::any::type_name::<T>();

    if !diags::enter(ctx, path, diags) {
        return None;
    }

    let Some(object_type) = ty.as_object() else {
        diags.push(diags::declared_type(path, ty, source));
        return None;
    };

    let field_map = match type_fields::<T>(ctx.options().max_depth) {
        Ok(map) => map,
        Err(err) => {
            diags.push(diags::incompatible(path, source, "an object", err));
            return None;
        }
    };

    let attribute_types = object_type.attribute_types();
    let attribute_names = attribute_types.keys().map(String::as_str);
    if let Err(mismatch) = reconcile(field_map.names(), attribute_names) {
        diags.push(diags::structural(path, mismatch.message(Counterpart::Attributes)));
        return None;
    }

    tracing::debug!(%path, record = source, fields = field_map.len(), "encoding record");

    let mut object_types = BTreeMap::new();
    let mut object_values = BTreeMap::new();

    for field in field_map.iter() {
        let field_path = path.at_name(field.name());

        if ctx.is_cancelled() {
            diags.push(diags::cancelled(&field_path));
            return None;
        }

        let Some(attribute_type) = attribute_types.get(field.name()) else {
            diags.push(diags::conversion(
                &field_path,
                format!(
                    "couldn't find type information for attribute at {field_path} \
                     in supplied type {ty}"
                ),
            ));
            return None;
        };
        let Some(slot) = record.slot(field.index()) else {
            diags.push(diags::conversion(
                &field_path,
                format!("{source} has no field at `{}`", field.field()),
            ));
            return None;
        };

        tracing::trace!(path = %field_path, "encoding field");
        let attribute_value = slot.encode(ctx, attribute_type, &field_path, diags);

        if diags.has_error() {
            return None;
        }
        let Some(attribute_value) = attribute_value else {
            diags.push(diags::conversion(&field_path, "field produced no value"));
            return None;
        };

        let wire = match attribute_value.to_wire(ctx) {
            Ok(wire) => wire,
            Err(err) => {
                diags.push(diags::value_error(&field_path, err));
                return None;
            }
        };

        object_types.insert(field.name().to_string(), attribute_type.clone());
        object_values.insert(field.name().to_string(), wire);
    }

    let assembled = match ObjectValue::new(ObjectType::new(object_types), object_values) {
        Ok(object) => Value::Object(object),
        Err(err) => {
            diags.push(diags::value_error(path, err));
            return None;
        }
    };

    if let Some(validator) = object_type.validator() {
        diags.append(validator.validate(ctx, &assembled, path));

        if diags.has_error() {
            return None;
        }
    }

    rewrap(ctx, object_type, assembled, path, diags)
}

/// Re-wrap the assembled object through `object_type`, keeping its hooks.
fn rewrap(
    ctx: &Context,
    object_type: &ObjectType,
    assembled: Value,
    path: &Path,
    diags: &mut Diagnostics,
) -> Option<Value> {
    let reconstructed = object_type.with_attribute_types(object_type.attribute_types().clone());
    match reconstructed.value_from_wire(ctx, assembled) {
        Ok(value) => Some(value),
        Err(err) => {
            diags.push(diags::value_error(path, err));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tether_api::{Context, Diagnostics, ObjectType, ObjectValue, Options, Path, Type, Value};
    use tokio_util::sync::CancellationToken;

    use super::rewrap;
    use crate::diags::{CANCELLED, CONVERSION_ERROR};

    fn named() -> ObjectType {
        ObjectType::from_attributes([("name", Type::String)])
    }

    #[test]
    fn rewrap_rejects_an_object_of_another_type() {
        let other = ObjectValue::new(
            ObjectType::from_attributes([("other", Type::Bool)]),
            BTreeMap::from([("other".to_string(), Value::Bool(true))]),
        )
        .unwrap();
        let path = Path::root().at_name("server");
        let mut diags = Diagnostics::new();

        let value = rewrap(&Context::default(), &named(), Value::Object(other), &path, &mut diags);

        assert!(value.is_none());
        let diag = diags.errors().next().unwrap();
        assert_eq!(diag.summary(), CONVERSION_ERROR);
        assert_eq!(diag.path(), &path);
        assert!(
            diag.detail().ends_with("expected object{name: string}, got object"),
            "{}",
            diag.detail()
        );
    }

    #[test]
    fn rewrap_keeps_the_validation_hook() {
        let object_type =
            named().with_validator(|_: &Context, _: &Value, _: &Path| Diagnostics::new());
        let assembled = Value::object(
            named(),
            BTreeMap::from([("name".to_string(), Value::String("a".into()))]),
        )
        .unwrap();
        let mut diags = Diagnostics::new();

        let value = rewrap(&Context::default(), &object_type, assembled, &Path::root(), &mut diags)
            .unwrap();

        assert!(diags.is_empty());
        assert!(value.as_object().unwrap().object_type().validator().is_some());
    }

    #[test]
    fn rewrap_reports_cancellation_with_its_own_summary() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = Context::new(Options::default()).with_token(token);
        let mut diags = Diagnostics::new();

        assert!(rewrap(&ctx, &named(), Value::Null, &Path::root(), &mut diags).is_none());
        assert_eq!(diags.errors().next().unwrap().summary(), CANCELLED);
    }
}
