//! Identity and credential types.
//!
//! The identity is the authenticated (or anonymous) principal attributed to
//! writes. It is created once per session by the session manager and is
//! immutable thereafter.

use serde::{Deserialize, Serialize};

/// The principal attributed to user-authored writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque user reference assigned by the platform.
    pub id: String,
    /// Whether this identity was created by anonymous sign-in.
    pub anonymous: bool,
}

impl Identity {
    /// Creates an identity resolved from a credential.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            anonymous: false,
        }
    }

    /// Creates an anonymous identity.
    pub fn anonymous(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            anonymous: true,
        }
    }
}

/// An opaque one-time sign-in token.
///
/// The token value is never logged or exposed in error messages; the `Debug`
/// implementation redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for handoff to the platform.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}
