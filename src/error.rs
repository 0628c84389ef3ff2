//! Structured error types for configuration assembly.

use crate::schema::TypeTag;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while assembling or validating configuration.
///
/// File errors only surface from required files; optional files swallow
/// them. Coercion and validation errors always surface.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required configuration file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required configuration file did not parse as a configuration tree.
    #[error("failed to parse config file {}: {source}", .path.display())]
    FileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An environment value could not be coerced to its declared type.
    #[error("environment variable {name}: cannot coerce {value:?} to {expected}")]
    Coercion {
        name: String,
        value: String,
        expected: TypeTag,
    },

    /// A stored value's runtime kind contradicts the schema.
    ///
    /// `expected` holds the bare schema tag (`"number"`, `"object"`, ...);
    /// the rendered message adds the article.
    #[error("expected {path} to be {}, was {actual}", describe(.expected))]
    Validation {
        path: String,
        expected: String,
        actual: &'static str,
    },
}

/// Article-prefixed description of an expected kind, for error text.
fn describe(tag: &str) -> String {
    match tag {
        "null" | "undefined" => tag.to_string(),
        _ if tag.starts_with(['a', 'e', 'i', 'o', 'u']) => format!("an {tag}"),
        _ => format!("a {tag}"),
    }
}

impl ConfigError {
    pub(crate) fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::FileRead {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn file_parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        ConfigError::FileParse {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn coercion(
        name: impl Into<String>,
        value: impl Into<String>,
        expected: TypeTag,
    ) -> Self {
        ConfigError::Coercion {
            name: name.into(),
            value: value.into(),
            expected,
        }
    }

    pub(crate) fn validation(
        path: impl Into<String>,
        expected: impl Into<String>,
        actual: &'static str,
    ) -> Self {
        ConfigError::Validation {
            path: path.into(),
            expected: expected.into(),
            actual,
        }
    }
}
