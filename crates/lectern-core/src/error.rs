//! Error types for the Lectern application.

use thiserror::Error;

/// A shared error type for the entire Lectern application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. No variant is fatal: every
/// failure is expected to degrade functionality rather than crash the process.
#[derive(Error, Debug, Clone)]
pub enum LecternError {
    /// Authentication failure (invalid or expired credential)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The external platform could not be reached at all
    #[error("Platform unavailable: {0}")]
    PlatformUnavailable(String),

    /// A live subscription stream reported an error
    #[error("Subscription error on '{collection}': {message}")]
    Subscription {
        collection: String,
        message: String,
    },

    /// A document write was rejected (permission, offline, validation)
    #[error("Write rejected on '{collection}': {message}")]
    Write {
        collection: String,
        message: String,
    },

    /// A user-authored field failed local validation and the command was skipped
    #[error("Validation skipped: '{field}' is empty or no identity is present")]
    Validation { field: &'static str },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LecternError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an Auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Creates a PlatformUnavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::PlatformUnavailable(message.into())
    }

    /// Creates a Subscription error
    pub fn subscription(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Subscription {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Creates a Write error
    pub fn write(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(field: &'static str) -> Self {
        Self::Validation { field }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an Auth error
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Check if this is a PlatformUnavailable error
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::PlatformUnavailable(_))
    }

    /// Check if this is a Subscription error
    pub fn is_subscription(&self) -> bool {
        matches!(self, Self::Subscription { .. })
    }

    /// Check if this is a Write error
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<serde_json::Error> for LecternError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for LecternError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from String (for error messages)
impl From<String> for LecternError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, LecternError>`.
pub type Result<T> = std::result::Result<T, LecternError>;
