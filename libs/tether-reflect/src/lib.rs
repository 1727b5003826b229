//! Conversion between attribute-tagged Rust structs and dynamic object values.
//!
//! A record's fields are mapped to object attributes through
//! `#[derive(Record)]`. Both directions require the field names and the
//! attribute names to match exactly; any difference is reported as a single
//! structural diagnostic before anything is converted.
//!
//! ```ignore
//! #[derive(Record, Default)]
//! struct Person {
//!     #[tether(name = "name")]
//!     name: String,
//!     #[tether(name = "age")]
//!     age: u32,
//! }
//!
//! let ty = Type::object([("name", Type::String), ("age", Type::Number)]);
//! let person: Person = into_record(&ctx, &ty, &value).into_result()?.0;
//! let back = from_record(&ctx, &ty, &person).into_result()?.0;
//! ```

extern crate self as tether_reflect;

pub mod convert;
pub mod decode;
pub mod diags;
pub mod encode;
pub mod error;
pub mod fields;
pub mod inspect;
pub mod outcome;
pub mod reconcile;
pub mod record;

pub use tether_api::{
    ConfigError, Context, Diagnostic, Diagnostics, Number, ObjectType, ObjectValue, Options, Path,
    PathStep, Severity, Type, Validate, Value, ValueError,
};
pub use tether_derive::Record;

pub use convert::{FromValue, IntoValue};
pub use decode::decode_struct;
pub use encode::encode_struct;
pub use error::MappingError;
pub use fields::{FieldDescriptor, FieldMap, type_fields};
pub use outcome::Outcome;
pub use record::{FieldSlot, FieldTag, Record, Tag};

/// Decode a record from an object value of type `ty`.
///
/// A null or unknown `value` decodes to `T::default()` when the matching
/// `unhandled_*_as_empty` option is set, and is an error otherwise.
pub fn into_record<T: Record>(ctx: &Context, ty: &Type, value: &Value) -> Outcome<T> {
    let mut diags = Diagnostics::new();
    let record = convert::record_from_value::<T>(ctx, ty, value, &Path::root(), &mut diags);
    Outcome::new(record, diags)
}

/// Encode a record as an object value of type `ty`.
pub fn from_record<T: Record>(ctx: &Context, ty: &Type, record: &T) -> Outcome<Value> {
    let mut diags = Diagnostics::new();
    let value = convert::record_into_value(record, ctx, ty, &Path::root(), &mut diags);
    Outcome::new(value, diags)
}
