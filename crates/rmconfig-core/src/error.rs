//! Error types for loading resource configuration.

use rmconfig_check::Report;
use thiserror::Error;

/// A result type using `ConfigError`.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while decoding, resolving or validating a document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document could not be decoded (unknown field, unknown
    /// variant tag, malformed value).
    #[error("failed to decode configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The JSON document could not be decoded.
    #[error("failed to decode configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The document decoded but its shape cannot be normalized.
    #[error("invalid configuration structure: {0}")]
    Structural(String),

    /// The resolved document violates one or more rules.
    #[error("{0}")]
    Invalid(#[from] Report),
}

impl ConfigError {
    /// Create a structural error.
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    /// Whether the error prevented the document from being walked at all,
    /// as opposed to a completed validation pass that found violations.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }

    /// The violation report, if this is a validation failure.
    #[must_use]
    pub const fn report(&self) -> Option<&Report> {
        match self {
            Self::Invalid(report) => Some(report),
            _ => None,
        }
    }
}
