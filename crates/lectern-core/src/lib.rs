//! Core domain types for Lectern.
//!
//! This crate defines the domain models (lessons, chat messages, identities),
//! the shared error taxonomy, configuration, and the contract of the external
//! platform collaborator. It carries no business logic beyond lenient
//! materialization and deterministic ordering of snapshot data; the session,
//! synchronization, and dispatch components live in `lectern-application`.

pub mod chat;
pub mod collection;
pub mod config;
pub mod document;
pub mod error;
pub mod identity;
pub mod lesson;
pub mod platform;

// Re-export common types
pub use chat::ChatMessage;
pub use collection::{CollectionKind, CollectionPath};
pub use config::AppConfig;
pub use document::{DocId, DocumentFields, RawDocument};
pub use error::{LecternError, Result};
pub use identity::{Credential, Identity};
pub use lesson::Lesson;
pub use platform::{Platform, SnapshotEvent, Subscription, SubscriptionGuard};
