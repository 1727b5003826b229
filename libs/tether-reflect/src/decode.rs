use tether_api::{Context, Diagnostics, Path, Type, Value};

use crate::diags;
use crate::fields::type_fields;
use crate::inspect::object_fields;
use crate::reconcile::{Counterpart, reconcile};
use crate::record::Record;

/// Build a `T` from an object value.
///
/// `ty` must be an object type and `value` an object. Every attribute-mapped
/// field of `T` must match exactly one attribute of the object and the other
/// way round; fields marked `skip` are left at their default.
///
/// Stops at the first field that fails to convert. Returns `None` whenever
/// an error diagnostic was recorded; no partially filled record escapes.
pub fn decode_struct<T: Record>(
    ctx: &Context,
    ty: &Type,
    value: &Value,
    path: &Path,
    diags: &mut Diagnostics,
) -> Option<T> {
    let mut local = Diagnostics::new();
    let record = decode_fields::<T>(ctx, ty, value, path, &mut local);
    if local.has_error() {
        tracing::debug!(%path, errors = local.errors().count(), "record decode aborted");
    }
    diags.append(local);
    record
}

fn decode_fields<T: Record>(
    ctx: &Context,
    ty: &Type,
    value: &Value,
    path: &Path,
    diags: &mut Diagnostics,
) -> Option<T> {
    let target = std::any::type_name::<T>();

    if !diags::enter(ctx, path, diags) {
        return None;
    }

    let Some(object_type) = ty.as_object() else {
        diags.push(diags::incompatible(
            path,
            value.kind(),
            target,
            format!(
                "cannot reflect object using type information provided by {ty}, \
                 it must be an object type"
            ),
        ));
        return None;
    };

    let object_fields = match object_fields(value) {
        Ok(fields) => fields,
        Err(_) => {
            diags.push(diags::incompatible(
                path,
                value.kind(),
                target,
                format!("cannot reflect {} into a struct, must be an object", value.kind()),
            ));
            return None;
        }
    };

    let field_map = match type_fields::<T>(ctx.options().max_depth) {
        Ok(map) => map,
        Err(err) => {
            diags.push(diags::incompatible(path, value.kind(), target, err));
            return None;
        }
    };

    if let Err(mismatch) = reconcile(field_map.names(), object_fields.keys().map(String::as_str)) {
        diags.push(diags::structural(path, mismatch.message(Counterpart::Object)));
        return None;
    }

    tracing::debug!(%path, record = target, fields = field_map.len(), "decoding record");

    let attribute_types = object_type.attribute_types();
    let mut result = T::default();

    for field in field_map.iter() {
        let field_path = path.at_name(field.name());

        if ctx.is_cancelled() {
            diags.push(diags::cancelled(&field_path));
            return None;
        }

        let Some(attribute_type) = attribute_types.get(field.name()) else {
            diags.push(diags::incompatible(
                path,
                value.kind(),
                target,
                format!(
                    "could not find type information for attribute `{}` in supplied type {ty}",
                    field.name()
                ),
            ));
            return None;
        };
        let Some(attribute_value) = object_fields.get(field.name()) else {
            diags.push(diags::structural(
                path,
                format!("object is missing attribute `{}`", field.name()),
            ));
            return None;
        };
        let Some(slot) = result.slot_mut(field.index()) else {
            diags.push(diags::conversion(
                &field_path,
                format!("{target} has no field at `{}`", field.field()),
            ));
            return None;
        };

        tracing::trace!(path = %field_path, "decoding field");
        let decoded = slot.decode(ctx, attribute_type, attribute_value, &field_path, diags);

        if diags.has_error() {
            return None;
        }
        if !decoded {
            diags.push(diags::conversion(&field_path, "field produced no value"));
            return None;
        }
    }

    Some(result)
}
