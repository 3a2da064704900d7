//! Lesson domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{DocId, DocumentFields, RawDocument};

/// A posted lesson. Lessons are created once and never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: DocId,
    pub title: String,
    pub content: String,
    pub author_id: String,
    /// Dispatch-time creation timestamp. `None` when the stored document
    /// lacks the field; such lessons sort after all dated ones.
    pub created_at: Option<DateTime<Utc>>,
}

impl Lesson {
    /// Materializes a lesson from a raw snapshot document.
    ///
    /// Missing or malformed fields degrade to empty strings or `None`;
    /// materialization never fails.
    pub fn from_document(doc: &RawDocument) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.str_field_or_empty("title"),
            content: doc.str_field_or_empty("content"),
            author_id: doc.str_field_or_empty("authorId"),
            created_at: doc.time_field("createdAt"),
        }
    }

    /// Builds the field map for a new lesson document.
    pub fn to_fields(
        title: &str,
        content: &str,
        author_id: &str,
        created_at: DateTime<Utc>,
    ) -> DocumentFields {
        let mut fields = DocumentFields::new();
        fields.insert("title".to_string(), title.into());
        fields.insert("content".to_string(), content.into());
        fields.insert("authorId".to_string(), author_id.into());
        fields.insert("createdAt".to_string(), created_at.to_rfc3339().into());
        fields
    }
}

/// Sorts lessons by creation time, newest first.
///
/// Lessons without a timestamp sort last. The sort is stable, so documents
/// with equal timestamps keep their snapshot order.
pub fn sort_newest_first(lessons: &mut [Lesson]) {
    lessons.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
