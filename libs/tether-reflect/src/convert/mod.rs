//! Type-directed conversion between native values and dynamic values.
//!
//! Every conversion is driven by the declared [`Type`]: the same Rust type
//! may accept several declared types (`Vec<T>` takes lists and sets) and
//! rejects the rest with a diagnostic.

mod collection;
mod primitive;

use tether_api::{Context, Diagnostics, Path, Type, Value};

use crate::decode::decode_struct;
use crate::diags;
use crate::encode::encode_struct;
use crate::record::Record;

/// Decode a native value from a dynamic value of the declared type.
pub trait FromValue: Sized {
    /// Returns `None` exactly when an error diagnostic was recorded.
    fn from_value(
        ctx: &Context,
        ty: &Type,
        value: &Value,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Self>;
}

/// Encode a native value as a dynamic value of the declared type.
pub trait IntoValue {
    /// Returns `None` exactly when an error diagnostic was recorded.
    fn into_value(
        &self,
        ctx: &Context,
        ty: &Type,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Value>;
}

/// `FromValue` for derived records: null/unknown handling, then the struct engine.
#[doc(hidden)]
pub fn record_from_value<T: Record>(
    ctx: &Context,
    ty: &Type,
    value: &Value,
    path: &Path,
    diags: &mut Diagnostics,
) -> Option<T> {
    if let Some(absent) = Absent::of(value) {
        return absent.resolve(ctx, path, diags);
    }
    decode_struct(ctx, ty, value, path, diags)
}

/// `IntoValue` for derived records.
#[doc(hidden)]
pub fn record_into_value<T: Record>(
    record: &T,
    ctx: &Context,
    ty: &Type,
    path: &Path,
    diags: &mut Diagnostics,
) -> Option<Value> {
    encode_struct(ctx, ty, record, path, diags)
}

/// Null or unknown arriving at a target that cannot represent it.
pub(crate) enum Absent {
    Null,
    Unknown,
}

impl Absent {
    pub(crate) fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Absent::Null),
            Value::Unknown => Some(Absent::Unknown),
            _ => None,
        }
    }

    /// Default value when the options allow it, an error otherwise.
    pub(crate) fn resolve<T: Default>(
        self,
        ctx: &Context,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<T> {
        let options = ctx.options();
        let target = std::any::type_name::<T>();
        match self {
            Absent::Null if options.unhandled_null_as_empty => Some(T::default()),
            Absent::Unknown if options.unhandled_unknown_as_empty => Some(T::default()),
            Absent::Null => {
                diags.push(diags::unhandled_null(path, target));
                None
            }
            Absent::Unknown => {
                diags.push(diags::unhandled_unknown(path, target));
                None
            }
        }
    }
}
