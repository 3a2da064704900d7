//! Application configuration.

use serde::{Deserialize, Serialize};

use crate::collection::{CollectionKind, CollectionPath};
use crate::error::Result;
use crate::identity::Credential;

/// Deployment configuration for the external platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment namespace prefixed to every collection path.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Application identifier within the namespace.
    #[serde(default = "default_app_id")]
    pub app_id: String,
    /// Optional one-time sign-in token. When absent, sign-in is anonymous.
    #[serde(default)]
    pub credential: Option<String>,
}

fn default_namespace() -> String {
    "deployments".to_string()
}

fn default_app_id() -> String {
    "lectern".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            app_id: default_app_id(),
            credential: None,
        }
    }
}

impl AppConfig {
    /// Parses a configuration from its TOML representation.
    ///
    /// # Errors
    ///
    /// Returns a `Serialization` error when the document is not valid TOML.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Returns the sign-in credential, if one is configured.
    pub fn credential(&self) -> Option<Credential> {
        self.credential.as_deref().map(Credential::new)
    }

    /// Builds the fully qualified path for one collection.
    pub fn collection_path(&self, kind: CollectionKind) -> CollectionPath {
        CollectionPath::new(&self.namespace, &self.app_id, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.namespace, "deployments");
        assert_eq!(config.app_id, "lectern");
        assert!(config.credential().is_none());
    }

    #[test]
    fn test_from_toml_str() {
        let config = AppConfig::from_toml_str(
            r#"
            namespace = "ns"
            app_id = "classroom-1"
            credential = "token-abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.app_id, "classroom-1");
        assert_eq!(config.credential().unwrap().as_str(), "token-abc");
        assert_eq!(
            config.collection_path(CollectionKind::Chat).to_string(),
            "ns/classroom-1/public/data/chat"
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("app_id = \"only-app\"").unwrap();
        assert_eq!(config.namespace, "deployments");
        assert_eq!(config.app_id, "only-app");
    }

    #[test]
    fn test_invalid_toml_is_a_serialization_error() {
        let err = AppConfig::from_toml_str("namespace = [").unwrap_err();
        assert!(matches!(
            err,
            crate::error::LecternError::Serialization { .. }
        ));
    }
}
