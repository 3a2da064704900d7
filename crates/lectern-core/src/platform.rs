//! The external platform collaborator.
//!
//! All durability, ordering, authentication, and real-time fan-out are
//! delegated to an external backend treated as an opaque collaborator. This
//! module defines the contract: authenticate once, open long-lived
//! subscriptions that push full collection snapshots, and create documents.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::collection::CollectionPath;
use crate::document::{DocId, DocumentFields, RawDocument};
use crate::error::Result;
use crate::identity::{Credential, Identity};

/// One push notification from a live subscription.
#[derive(Debug, Clone)]
pub enum SnapshotEvent {
    /// A complete, point-in-time listing of all documents in the collection,
    /// delivered on every change.
    Snapshot(Vec<RawDocument>),
    /// The stream reported an error. The subscription stays open; consumers
    /// keep their previous state.
    StreamError(String),
}

/// Releases the platform-side resources of one subscription.
///
/// `unsubscribe` is idempotent; dropping the guard without calling it also
/// releases the subscription. The platform observes the release exactly once.
#[derive(Debug)]
pub struct SubscriptionGuard {
    token: CancellationToken,
}

impl SubscriptionGuard {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn unsubscribe(&self) {
        self.token.cancel();
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// A long-lived, push-based subscription to one collection.
///
/// Events arrive in the order the platform emits them; the channel closes
/// after the guard is released.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::Receiver<SnapshotEvent>,
    guard: SubscriptionGuard,
}

impl Subscription {
    pub fn new(events: mpsc::Receiver<SnapshotEvent>, token: CancellationToken) -> Self {
        Self {
            events,
            guard: SubscriptionGuard::new(token),
        }
    }

    /// Receives the next snapshot event, or `None` once the stream ends.
    pub async fn recv(&mut self) -> Option<SnapshotEvent> {
        self.events.recv().await
    }

    /// Splits the subscription into its event stream and cancellation guard,
    /// so a consumer task can own the stream while its parent keeps the guard.
    pub fn into_parts(self) -> (mpsc::Receiver<SnapshotEvent>, SubscriptionGuard) {
        (self.events, self.guard)
    }

    /// Releases the subscription.
    pub fn unsubscribe(self) {
        self.guard.unsubscribe();
    }
}

/// The opaque backend collaborator.
///
/// Implementations must be safe to share across tasks; every method is
/// expected to fail with a typed [`LecternError`](crate::error::LecternError)
/// rather than panic.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Resolves an identity, anonymously when no credential is given.
    ///
    /// # Errors
    ///
    /// - `Auth`: the credential was rejected
    /// - `PlatformUnavailable`: the backend could not be reached
    async fn authenticate(&self, credential: Option<&Credential>) -> Result<Identity>;

    /// Opens a live subscription to one collection.
    ///
    /// The first snapshot reflects the collection's current contents; every
    /// subsequent change to the set re-delivers the full listing.
    async fn subscribe(&self, path: &CollectionPath) -> Result<Subscription>;

    /// Creates one document and returns its assigned id.
    ///
    /// # Errors
    ///
    /// - `Write`: the store rejected the write (permission, offline,
    ///   validation)
    async fn create_document(&self, path: &CollectionPath, fields: DocumentFields) -> Result<DocId>;
}
