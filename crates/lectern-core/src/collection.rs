//! Collection naming and path construction.
//!
//! Collections live under a deployment namespace and application identifier,
//! in a fixed "public data" segment:
//! `<namespace>/<app_id>/public/data/<collection>`.

use serde::{Deserialize, Serialize};

/// The collections tracked by this application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// Posted lessons, newest first.
    Lessons,
    /// Chat messages, oldest first.
    Chat,
}

impl CollectionKind {
    /// Returns the collection's path segment name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lessons => "lessons",
            Self::Chat => "chat",
        }
    }
}

/// A fully qualified path to one collection in the external store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    namespace: String,
    app_id: String,
    kind: CollectionKind,
}

impl CollectionPath {
    pub fn new(namespace: impl Into<String>, app_id: impl Into<String>, kind: CollectionKind) -> Self {
        Self {
            namespace: namespace.into(),
            app_id: app_id.into(),
            kind,
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }
}

impl std::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/public/data/{}",
            self.namespace,
            self.app_id,
            self.kind.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_format() {
        let path = CollectionPath::new("deployments", "classroom-1", CollectionKind::Lessons);
        assert_eq!(path.to_string(), "deployments/classroom-1/public/data/lessons");
    }

    #[test]
    fn test_chat_segment() {
        let path = CollectionPath::new("ns", "app", CollectionKind::Chat);
        assert_eq!(path.to_string(), "ns/app/public/data/chat");
        assert_eq!(path.kind(), CollectionKind::Chat);
    }
}
