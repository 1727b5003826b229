//! Diagnostic summaries, and the constructors shared by the struct engines
//! and converters.

use std::fmt;

use tether_api::{Context, Diagnostic, Diagnostics, Path, Type, ValueError};

pub const INCOMPATIBLE_TYPES: &str = "Incompatible Types";
pub const STRUCTURAL_MISMATCH: &str = "Structural Mismatch";
pub const CONVERSION_ERROR: &str = "Value Conversion Error";
pub const CANCELLED: &str = "Conversion Cancelled";
pub const RECURSION_LIMIT: &str = "Recursion Limit Exceeded";
pub const UNHANDLED_NULL: &str = "Unhandled Null Value";
pub const UNHANDLED_UNKNOWN: &str = "Unhandled Unknown Value";

/// Source value or declared type cannot be converted into `target`.
pub(crate) fn incompatible(
    path: &Path,
    found: impl fmt::Display,
    target: &str,
    err: impl fmt::Display,
) -> Diagnostic {
    Diagnostic::error(
        INCOMPATIBLE_TYPES,
        format!("cannot convert {found} into {target}: {err}"),
    )
    .with_path(path.clone())
}

/// Declared type and native type disagree (e.g. `bool` against `number`).
pub(crate) fn declared_type(path: &Path, declared: &Type, target: &str) -> Diagnostic {
    incompatible(
        path,
        declared,
        target,
        format!("{target} cannot hold values of type {declared}"),
    )
}

/// Value shape does not match its declared type.
pub(crate) fn value_shape(
    path: &Path,
    declared: &Type,
    found: &'static str,
    target: &str,
) -> Diagnostic {
    incompatible(path, found, target, format!("expected a {declared} value"))
}

pub(crate) fn structural(path: &Path, message: String) -> Diagnostic {
    Diagnostic::error(STRUCTURAL_MISMATCH, message).with_path(path.clone())
}

pub(crate) fn conversion(path: &Path, err: impl fmt::Display) -> Diagnostic {
    Diagnostic::error(
        CONVERSION_ERROR,
        format!(
            "An unexpected error was encountered while converting the value at this path: \
             {err}"
        ),
    )
    .with_path(path.clone())
}

/// Conversion diagnostic for a value-model error; cancellation keeps its own summary.
pub(crate) fn value_error(path: &Path, err: ValueError) -> Diagnostic {
    match err {
        ValueError::Cancelled => cancelled(path),
        other => conversion(path, other),
    }
}

pub(crate) fn cancelled(path: &Path) -> Diagnostic {
    Diagnostic::error(CANCELLED, "the conversion was cancelled before it completed")
        .with_path(path.clone())
}

pub(crate) fn unhandled_null(path: &Path, target: &str) -> Diagnostic {
    Diagnostic::error(
        UNHANDLED_NULL,
        format!("received null value, however the target type {target} cannot handle null values"),
    )
    .with_path(path.clone())
}

pub(crate) fn unhandled_unknown(path: &Path, target: &str) -> Diagnostic {
    Diagnostic::error(
        UNHANDLED_UNKNOWN,
        format!(
            "received unknown value, however the target type {target} \
             cannot handle unknown values"
        ),
    )
    .with_path(path.clone())
}

/// Gate for every record or collection conversion: fails on cancellation
/// and on paths longer than `max_depth`.
pub(crate) fn enter(ctx: &Context, path: &Path, diags: &mut Diagnostics) -> bool {
    if ctx.is_cancelled() {
        diags.push(cancelled(path));
        return false;
    }
    let limit = ctx.options().max_depth;
    if path.len() > limit {
        diags.push(
            Diagnostic::error(
                RECURSION_LIMIT,
                format!("value is nested deeper than the configured limit of {limit}"),
            )
            .with_path(path.clone()),
        );
        return false;
    }
    true
}
