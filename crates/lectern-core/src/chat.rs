//! Chat message domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{DocId, DocumentFields, RawDocument};

/// A single chat message. Messages are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: DocId,
    pub text: String,
    pub author_id: String,
    /// Dispatch-time timestamp. `None` when the stored document lacks the
    /// field; such messages sort before all dated ones.
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Materializes a chat message from a raw snapshot document.
    pub fn from_document(doc: &RawDocument) -> Self {
        Self {
            id: doc.id.clone(),
            text: doc.str_field_or_empty("text"),
            author_id: doc.str_field_or_empty("authorId"),
            timestamp: doc.time_field("timestamp"),
        }
    }

    /// Builds the field map for a new chat message document.
    pub fn to_fields(text: &str, author_id: &str, timestamp: DateTime<Utc>) -> DocumentFields {
        let mut fields = DocumentFields::new();
        fields.insert("text".to_string(), text.into());
        fields.insert("authorId".to_string(), author_id.into());
        fields.insert("timestamp".to_string(), timestamp.to_rfc3339().into());
        fields
    }
}

/// Sorts chat messages by timestamp, oldest first.
///
/// Messages without a timestamp sort first. The sort is stable.
pub fn sort_oldest_first(messages: &mut [ChatMessage]) {
    messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
}
