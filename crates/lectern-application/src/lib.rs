//! Application components for Lectern.
//!
//! # Module Structure
//!
//! - `session_manager`: identity resolution and the readiness signal
//! - `synchronizer`: live subscription reduction into ordered view state
//! - `dispatcher`: validated submission of user-authored writes
//!
//! Control flow: [`SessionManager`] establishes an identity and signals
//! readiness, the [`Synchronizer`] starts once readiness is signaled and
//! keeps the two view sequences in sync with the store, and the
//! [`CommandDispatcher`] writes user input back. New items appear in the
//! views only through the store's next push notification.

pub mod dispatcher;
pub mod session_manager;
pub mod synchronizer;

// Re-export public API
pub use dispatcher::{CommandDispatcher, Composer, DispatchOutcome, SkipReason};
pub use session_manager::SessionManager;
pub use synchronizer::Synchronizer;
