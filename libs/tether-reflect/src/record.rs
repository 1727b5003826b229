use tether_api::{Context, Diagnostics, Path, Type, Value};

use crate::convert::{FromValue, IntoValue};

/// How one struct field relates to the object's attributes.
#[derive(Debug, Clone, Copy)]
pub enum Tag {
    /// Maps to the attribute with this name.
    Name(&'static str),
    /// Explicitly not part of the object.
    Skip,
    /// A nested record whose attributes are promoted into the parent.
    Embed(fn() -> Vec<FieldTag>),
    /// No tag at all. Rejected by the field mapper; the derive never emits it.
    Untagged,
}

/// Declaration-order entry in a record's field table.
#[derive(Debug, Clone, Copy)]
pub struct FieldTag {
    /// Rust field name, for error messages.
    pub field: &'static str,
    pub tag: Tag,
}

/// A record field, type-erased so the struct engines can convert it
/// without knowing its concrete type.
pub trait FieldSlot {
    /// Decode `value` into this slot. Returns `false`, leaving the slot
    /// untouched, when an error diagnostic was recorded.
    fn decode(
        &mut self,
        ctx: &Context,
        ty: &Type,
        value: &Value,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> bool;

    fn encode(
        &self,
        ctx: &Context,
        ty: &Type,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Value>;
}

impl<T: FromValue + IntoValue> FieldSlot for T {
    fn decode(
        &mut self,
        ctx: &Context,
        ty: &Type,
        value: &Value,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> bool {
        match T::from_value(ctx, ty, value, path, diags) {
            Some(converted) => {
                *self = converted;
                true
            }
            None => false,
        }
    }

    fn encode(
        &self,
        ctx: &Context,
        ty: &Type,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Value> {
        self.into_value(ctx, ty, path, diags)
    }
}

/// A struct whose fields map onto object attributes.
///
/// Normally derived with `#[derive(Record)]`. `index` arguments are
/// positions in [`Record::field_tags`], one per embedding level.
pub trait Record: Default {
    fn field_tags() -> Vec<FieldTag>;

    fn slot(&self, index: &[usize]) -> Option<&dyn FieldSlot>;

    fn slot_mut(&mut self, index: &[usize]) -> Option<&mut dyn FieldSlot>;
}
