//! Raw document types as delivered by the external store.
//!
//! Snapshots carry documents in an untyped field map. Materialization into
//! domain entities must tolerate missing or malformed fields, so the accessors
//! here are lenient and never panic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Untyped document fields, as stored by the platform.
pub type DocumentFields = serde_json::Map<String, serde_json::Value>;

/// Opaque document identifier assigned at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocId(String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh UUID-based identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One document of a collection snapshot, before materialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: DocId,
    pub fields: DocumentFields,
}

impl RawDocument {
    pub fn new(id: DocId, fields: DocumentFields) -> Self {
        Self { id, fields }
    }

    /// Returns a string field, or `None` if absent or not a string.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|value| value.as_str())
    }

    /// Returns a string field, defaulting to empty when absent.
    pub fn str_field_or_empty(&self, name: &str) -> String {
        self.str_field(name).unwrap_or_default().to_string()
    }

    /// Returns a timestamp field parsed from its RFC 3339 string form.
    ///
    /// Absent or unparseable values yield `None`; ordering logic treats that
    /// as the minimum value rather than failing.
    pub fn time_field(&self, name: &str) -> Option<DateTime<Utc>> {
        self.str_field(name)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(fields: serde_json::Value) -> RawDocument {
        let serde_json::Value::Object(map) = fields else {
            panic!("test fields must be an object");
        };
        RawDocument::new(DocId::new("d1"), map)
    }

    #[test]
    fn test_str_field_lenient() {
        let doc = doc(json!({"title": "Intro", "count": 3}));
        assert_eq!(doc.str_field("title"), Some("Intro"));
        assert_eq!(doc.str_field("count"), None);
        assert_eq!(doc.str_field("missing"), None);
        assert_eq!(doc.str_field_or_empty("missing"), "");
    }

    #[test]
    fn test_time_field_parses_rfc3339() {
        let doc = doc(json!({"createdAt": "2024-05-01T10:30:00Z", "bad": "yesterday"}));
        let parsed = doc.time_field("createdAt").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T10:30:00+00:00");
        assert_eq!(doc.time_field("bad"), None);
        assert_eq!(doc.time_field("missing"), None);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(DocId::generate(), DocId::generate());
    }
}
