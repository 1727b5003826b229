use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Conversion options, shared by every call made with one [`Context`](crate::Context).
///
/// Loadable from TOML; every key is optional:
///
/// ```toml
/// max_depth = 32
/// unhandled_null_as_empty = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    /// Longest path a record or collection may be converted at.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Decode a null into a target that cannot hold one as its default value.
    #[serde(default)]
    pub unhandled_null_as_empty: bool,

    /// Decode an unknown into a target that cannot hold one as its default value.
    #[serde(default)]
    pub unhandled_unknown_as_empty: bool,
}

fn default_max_depth() -> usize {
    64
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            unhandled_null_as_empty: false,
            unhandled_unknown_as_empty: false,
        }
    }
}

impl Options {
    /// Load options from a TOML file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse options from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(Options::parse("").unwrap(), Options::default());
        assert_eq!(Options::default().max_depth, 64);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Options::parse("max_dept = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_depth = 8\nunhandled_null_as_empty = true").unwrap();

        let options = Options::load(file.path()).unwrap();
        assert_eq!(options.max_depth, 8);
        assert!(options.unhandled_null_as_empty);
        assert!(!options.unhandled_unknown_as_empty);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Options::load("/nonexistent/tether.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tether.toml"));
    }
}
