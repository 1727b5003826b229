use tether_api::{Context, Diagnostics, Number, Path, Type, Value};

use super::{Absent, FromValue, IntoValue};
use crate::diags;

/// Record a diagnostic unless `declared` is exactly `expected`.
fn expect_type<T>(
    declared: &Type,
    expected: &Type,
    path: &Path,
    diags: &mut Diagnostics,
) -> Option<()> {
    if declared == expected {
        Some(())
    } else {
        diags.push(diags::declared_type(path, declared, std::any::type_name::<T>()));
        None
    }
}

impl FromValue for bool {
    fn from_value(
        ctx: &Context,
        ty: &Type,
        value: &Value,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Self> {
        expect_type::<Self>(ty, &Type::Bool, path, diags)?;
        match value {
            Value::Bool(b) => Some(*b),
            Value::Null | Value::Unknown => Absent::of(value)?.resolve(ctx, path, diags),
            other => {
                diags.push(diags::value_shape(path, ty, other.kind(), "bool"));
                None
            }
        }
    }
}

impl IntoValue for bool {
    fn into_value(
        &self,
        _ctx: &Context,
        ty: &Type,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Value> {
        expect_type::<Self>(ty, &Type::Bool, path, diags)?;
        Some(Value::Bool(*self))
    }
}

impl FromValue for String {
    fn from_value(
        ctx: &Context,
        ty: &Type,
        value: &Value,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Self> {
        expect_type::<Self>(ty, &Type::String, path, diags)?;
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Null | Value::Unknown => Absent::of(value)?.resolve(ctx, path, diags),
            other => {
                diags.push(diags::value_shape(path, ty, other.kind(), "String"));
                None
            }
        }
    }
}

impl IntoValue for String {
    fn into_value(
        &self,
        _ctx: &Context,
        ty: &Type,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Value> {
        expect_type::<Self>(ty, &Type::String, path, diags)?;
        Some(Value::String(self.clone()))
    }
}

/// Integer view of a number, accepting whole floats.
fn integer<T>(n: &Number) -> Option<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    if let Some(v) = n.as_i64() {
        return <T as TryFrom<i64>>::try_from(v).ok();
    }
    if let Some(v) = n.as_u64() {
        return <T as TryFrom<u64>>::try_from(v).ok();
    }
    let f = n.as_f64()?;
    if f.fract() != 0.0 || !f.is_finite() {
        return None;
    }
    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
        <T as TryFrom<i64>>::try_from(f as i64).ok()
    } else if f >= 0.0 && f < u64::MAX as f64 {
        <T as TryFrom<u64>>::try_from(f as u64).ok()
    } else {
        None
    }
}

macro_rules! impl_integer {
    ($($ty:ty),* $(,)?) => {$(
        impl FromValue for $ty {
            fn from_value(
                ctx: &Context,
                ty: &Type,
                value: &Value,
                path: &Path,
                diags: &mut Diagnostics,
            ) -> Option<Self> {
                expect_type::<Self>(ty, &Type::Number, path, diags)?;
                match value {
                    Value::Number(n) => match integer::<$ty>(n) {
                        Some(v) => Some(v),
                        None => {
                            diags.push(diags::conversion(
                                path,
                                format!("{n} cannot be represented as {}", stringify!($ty)),
                            ));
                            None
                        }
                    },
                    Value::Null | Value::Unknown => Absent::of(value)?.resolve(ctx, path, diags),
                    other => {
                        diags.push(diags::value_shape(path, ty, other.kind(), stringify!($ty)));
                        None
                    }
                }
            }
        }

        impl IntoValue for $ty {
            fn into_value(
                &self,
                _ctx: &Context,
                ty: &Type,
                path: &Path,
                diags: &mut Diagnostics,
            ) -> Option<Value> {
                expect_type::<Self>(ty, &Type::Number, path, diags)?;
                Some(Value::Number(Number::from(*self)))
            }
        }
    )*};
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(
        ctx: &Context,
        ty: &Type,
        value: &Value,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Self> {
        expect_type::<Self>(ty, &Type::Number, path, diags)?;
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(v) => Some(v),
                None => {
                    let detail = format!("{n} cannot be represented as f64");
                    diags.push(diags::conversion(path, detail));
                    None
                }
            },
            Value::Null | Value::Unknown => Absent::of(value)?.resolve(ctx, path, diags),
            other => {
                diags.push(diags::value_shape(path, ty, other.kind(), "f64"));
                None
            }
        }
    }
}

impl IntoValue for f64 {
    fn into_value(
        &self,
        _ctx: &Context,
        ty: &Type,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Value> {
        expect_type::<Self>(ty, &Type::Number, path, diags)?;
        match Number::from_f64(*self) {
            Some(n) => Some(Value::Number(n)),
            None => {
                diags.push(diags::conversion(path, format!("{self} is not a finite number")));
                None
            }
        }
    }
}

impl FromValue for f32 {
    fn from_value(
        ctx: &Context,
        ty: &Type,
        value: &Value,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Self> {
        let wide = f64::from_value(ctx, ty, value, path, diags)?;
        if wide.abs() > f32::MAX as f64 {
            diags.push(diags::conversion(path, format!("{wide} cannot be represented as f32")));
            return None;
        }
        Some(wide as f32)
    }
}

impl IntoValue for f32 {
    fn into_value(
        &self,
        ctx: &Context,
        ty: &Type,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Option<Value> {
        f64::from(*self).into_value(ctx, ty, path, diags)
    }
}
