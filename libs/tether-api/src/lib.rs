pub mod config;
pub mod context;
pub mod diag;
pub mod error;
pub mod path;
pub mod types;
pub mod value;

pub use config::Options;
pub use context::Context;
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use error::{ConfigError, ValueError};
pub use path::{Path, PathStep};
pub use types::{ObjectType, Type, Validate};
pub use value::{Number, ObjectValue, Value};
