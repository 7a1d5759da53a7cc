//! Error types for opsql.

use thiserror::Error;

/// The main error type for opsql operations.
#[derive(Debug, Error)]
pub enum OpsqlError {
    /// A node is missing a child the compiler cannot do without.
    #[error("Malformed tree: {node} node has no {field}")]
    MissingChild {
        node: &'static str,
        field: &'static str,
    },

    /// Raw fragments and parameters do not alternate.
    #[error("Raw node has {fragments} fragment(s) for {params} parameter(s)")]
    RawArity { fragments: usize, params: usize },

    /// Failed to parse a raw template string.
    #[error("Template error at position {position}: {message}")]
    Template { position: usize, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OpsqlError {
    /// Create a malformed tree error.
    pub fn missing(node: &'static str, field: &'static str) -> Self {
        Self::MissingChild { node, field }
    }

    /// Create a template error at the given position.
    pub fn template(position: usize, message: impl Into<String>) -> Self {
        Self::Template {
            position,
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for OpsqlError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for opsql operations.
pub type OpsqlResult<T> = Result<T, OpsqlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OpsqlError::missing("Query", "from");
        assert_eq!(err.to_string(), "Malformed tree: Query node has no from");
    }

    #[test]
    fn test_raw_arity_display() {
        let err = OpsqlError::RawArity {
            fragments: 1,
            params: 1,
        };
        assert_eq!(
            err.to_string(),
            "Raw node has 1 fragment(s) for 1 parameter(s)"
        );
    }
}
