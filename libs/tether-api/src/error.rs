/// Errors from constructing or re-wrapping dynamic values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error(
        "object attributes do not match its type: missing [{}], unexpected [{}]",
        missing.join(", "),
        unexpected.join(", ")
    )]
    AttributeMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("attribute '{name}' expected {expected}, got {found}")]
    AttributeType {
        name: String,
        expected: String,
        found: &'static str,
    },

    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: String,
        found: &'static str,
    },

    #[error("set contains a duplicate element at index {0}")]
    DuplicateSetElement(usize),

    #[error("unknown values have no JSON representation")]
    UnknownNotRepresentable,

    #[error("operation cancelled")]
    Cancelled,
}

/// Errors from loading [`Options`](crate::Options).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config (read): '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config (parse): {0}")]
    Parse(#[from] toml::de::Error),
}
