//! Command dispatch for user-authored writes.
//!
//! The dispatcher validates and submits new lessons and chat messages,
//! guarded by the current session identity. Validation failures are a
//! deliberate silent no-op (the form's "disabled state"), reported as a
//! [`DispatchOutcome::Skipped`] for observability rather than surfaced as
//! errors. There is no retry and no optimistic local insert: a written item
//! only appears once the synchronizer's next snapshot includes it.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use lectern_core::chat::ChatMessage;
use lectern_core::collection::{CollectionKind, CollectionPath};
use lectern_core::config::AppConfig;
use lectern_core::document::DocId;
use lectern_core::error::Result;
use lectern_core::lesson::Lesson;
use lectern_core::platform::Platform;

use crate::session_manager::SessionManager;

/// Why a command was skipped without any network effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No identity is present; writes are disabled.
    NoIdentity,
    /// The named field was empty after trimming whitespace.
    EmptyField(&'static str),
}

/// The result of a dispatch attempt that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The document was created with this id.
    Written(DocId),
    /// Preconditions failed; nothing was written and drafts were left as set.
    Skipped(SkipReason),
}

/// Draft input fields, as last set by the caller.
///
/// On a successful dispatch the corresponding fields are cleared; on a write
/// failure they are preserved so the draft can be resubmitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    pub lesson_title: String,
    pub lesson_content: String,
    pub chat_input: String,
}

/// Validates and submits user-authored writes.
pub struct CommandDispatcher {
    platform: Arc<dyn Platform>,
    session: Arc<SessionManager>,
    lessons_path: CollectionPath,
    chat_path: CollectionPath,
    composer: RwLock<Composer>,
}

impl CommandDispatcher {
    pub fn new(platform: Arc<dyn Platform>, session: Arc<SessionManager>, config: &AppConfig) -> Self {
        Self {
            platform,
            session,
            lessons_path: config.collection_path(CollectionKind::Lessons),
            chat_path: config.collection_path(CollectionKind::Chat),
            composer: RwLock::new(Composer::default()),
        }
    }

    /// Returns the current draft fields.
    pub async fn composer(&self) -> Composer {
        self.composer.read().await.clone()
    }

    /// Posts a new lesson.
    ///
    /// The arguments become the current drafts. Preconditions (identity
    /// present, title and content non-empty after trimming) are checked
    /// before any network effect; failing them skips the write and leaves the
    /// drafts exactly as set. On success both lesson drafts are cleared; the
    /// creation timestamp is assigned here at dispatch time.
    ///
    /// # Errors
    ///
    /// Returns a `Write` error when the store rejects the document; the
    /// drafts are preserved for resubmission.
    pub async fn post_lesson(&self, title: &str, content: &str) -> Result<DispatchOutcome> {
        {
            let mut composer = self.composer.write().await;
            composer.lesson_title = title.to_string();
            composer.lesson_content = content.to_string();
        }

        let Some(identity) = self.session.identity().await else {
            tracing::debug!("lesson dispatch skipped: no identity");
            return Ok(DispatchOutcome::Skipped(SkipReason::NoIdentity));
        };
        if let Some(reason) = first_empty_field(&[("title", title), ("content", content)]) {
            tracing::debug!("lesson dispatch skipped: empty '{}'", reason);
            return Ok(DispatchOutcome::Skipped(SkipReason::EmptyField(reason)));
        }

        let fields = Lesson::to_fields(title, content, &identity.id, Utc::now());
        match self.platform.create_document(&self.lessons_path, fields).await {
            Ok(doc_id) => {
                let mut composer = self.composer.write().await;
                composer.lesson_title.clear();
                composer.lesson_content.clear();
                tracing::info!("posted lesson {}", doc_id);
                Ok(DispatchOutcome::Written(doc_id))
            }
            Err(err) => {
                tracing::warn!("lesson write rejected, draft preserved: {}", err);
                Err(err)
            }
        }
    }

    /// Sends a new chat message.
    ///
    /// Same contract as [`post_lesson`](Self::post_lesson), with the chat
    /// input as the single validated draft field.
    ///
    /// # Errors
    ///
    /// Returns a `Write` error when the store rejects the document.
    pub async fn send_message(&self, text: &str) -> Result<DispatchOutcome> {
        {
            let mut composer = self.composer.write().await;
            composer.chat_input = text.to_string();
        }

        let Some(identity) = self.session.identity().await else {
            tracing::debug!("message dispatch skipped: no identity");
            return Ok(DispatchOutcome::Skipped(SkipReason::NoIdentity));
        };
        if text.trim().is_empty() {
            tracing::debug!("message dispatch skipped: empty 'message'");
            return Ok(DispatchOutcome::Skipped(SkipReason::EmptyField("message")));
        }

        let fields = ChatMessage::to_fields(text, &identity.id, Utc::now());
        match self.platform.create_document(&self.chat_path, fields).await {
            Ok(doc_id) => {
                self.composer.write().await.chat_input.clear();
                tracing::info!("sent message {}", doc_id);
                Ok(DispatchOutcome::Written(doc_id))
            }
            Err(err) => {
                tracing::warn!("message write rejected, draft preserved: {}", err);
                Err(err)
            }
        }
    }
}

/// Returns the name of the first field that is empty after trimming.
fn first_empty_field(fields: &[(&'static str, &str)]) -> Option<&'static str> {
    fields
        .iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
}
