//! In-memory platform implementation.
//!
//! A process-local document store with live snapshot fan-out: every created
//! document re-emits the full collection listing to all open subscriptions of
//! that collection. Used by tests and embeddable single-process deployments.
//!
//! The implementation also exposes fault-injection switches (offline mode,
//! forced write failures, injected stream errors) and introspection counters
//! so the application components can be tested against degraded conditions.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use lectern_core::collection::CollectionPath;
use lectern_core::document::{DocId, DocumentFields, RawDocument};
use lectern_core::error::{LecternError, Result};
use lectern_core::identity::{Credential, Identity};
use lectern_core::platform::{Platform, SnapshotEvent, Subscription};

/// Per-subscription channel capacity. Snapshots are full replacements, so a
/// consumer that falls behind only ever misses intermediate listings.
const CHANNEL_CAPACITY: usize = 32;

#[derive(Default)]
struct CollectionState {
    docs: Vec<RawDocument>,
    subscribers: Vec<(u64, mpsc::Sender<SnapshotEvent>)>,
}

/// An in-memory implementation of the [`Platform`] collaborator.
pub struct MemoryPlatform {
    collections: Arc<Mutex<HashMap<String, CollectionState>>>,
    /// Registered one-time tokens, mapped to the user id they resolve to.
    credentials: Mutex<HashMap<String, String>>,
    offline: AtomicBool,
    fail_writes: AtomicBool,
    unsubscribes: Arc<AtomicUsize>,
    next_subscriber_id: AtomicU64,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(Mutex::new(HashMap::new())),
            credentials: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            unsubscribes: Arc::new(AtomicUsize::new(0)),
            next_subscriber_id: AtomicU64::new(0),
        }
    }

    /// Registers a credential token that resolves to the given user id.
    pub async fn register_credential(&self, token: impl Into<String>, user_id: impl Into<String>) {
        let mut credentials = self.credentials.lock().await;
        credentials.insert(token.into(), user_id.into());
    }

    /// Simulates the platform being unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Forces all subsequent writes to be rejected.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Pushes a stream error to every open subscription of one collection.
    pub async fn emit_stream_error(&self, path: &CollectionPath, message: impl Into<String>) {
        let message = message.into();
        let mut collections = self.collections.lock().await;
        if let Some(state) = collections.get_mut(&path.to_string()) {
            fan_out(state, SnapshotEvent::StreamError(message));
        }
    }

    /// Returns the documents currently stored for one collection.
    pub async fn documents(&self, path: &CollectionPath) -> Vec<RawDocument> {
        let collections = self.collections.lock().await;
        collections
            .get(&path.to_string())
            .map(|state| state.docs.clone())
            .unwrap_or_default()
    }

    /// Returns the number of open subscriptions for one collection.
    pub async fn subscriber_count(&self, path: &CollectionPath) -> usize {
        let collections = self.collections.lock().await;
        collections
            .get(&path.to_string())
            .map(|state| state.subscribers.len())
            .unwrap_or_default()
    }

    /// Returns how many subscription releases the platform has observed.
    pub fn unsubscribe_count(&self) -> usize {
        self.unsubscribes.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(LecternError::unavailable("platform is offline"))
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

/// Delivers one event to every live subscriber, dropping closed channels.
fn fan_out(state: &mut CollectionState, event: SnapshotEvent) {
    state.subscribers.retain(|(id, sender)| {
        match sender.try_send(event.clone()) {
            Ok(()) => true,
            // A full channel means the consumer is behind; the next change
            // re-delivers the complete listing, so skipping is safe.
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!("subscriber {} is lagging, skipping snapshot", id);
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    });
}

#[async_trait]
impl Platform for MemoryPlatform {
    async fn authenticate(&self, credential: Option<&Credential>) -> Result<Identity> {
        self.check_online()?;
        match credential {
            Some(credential) => {
                let credentials = self.credentials.lock().await;
                credentials
                    .get(credential.as_str())
                    .map(|user_id| Identity::new(user_id.as_str()))
                    .ok_or_else(|| LecternError::auth("credential rejected"))
            }
            None => Ok(Identity::anonymous(format!("anon-{}", Uuid::new_v4()))),
        }
    }

    async fn subscribe(&self, path: &CollectionPath) -> Result<Subscription> {
        self.check_online()?;

        let key = path.to_string();
        let subscriber_id = self.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let token = CancellationToken::new();

        {
            let mut collections = self.collections.lock().await;
            let state = collections.entry(key.clone()).or_default();
            // Initial snapshot reflects the collection's current contents.
            let initial = SnapshotEvent::Snapshot(state.docs.clone());
            if sender.try_send(initial).is_err() {
                return Err(LecternError::subscription(key, "subscriber channel closed"));
            }
            state.subscribers.push((subscriber_id, sender));
        }

        // Platform-side release: observed exactly once, when the guard is
        // cancelled. Dropping the sender closes the subscriber's stream.
        let collections = Arc::clone(&self.collections);
        let unsubscribes = Arc::clone(&self.unsubscribes);
        let cleanup_token = token.clone();
        tokio::spawn(async move {
            cleanup_token.cancelled().await;
            unsubscribes.fetch_add(1, Ordering::SeqCst);
            let mut collections = collections.lock().await;
            if let Some(state) = collections.get_mut(&key) {
                state.subscribers.retain(|(id, _)| *id != subscriber_id);
            }
        });

        tracing::debug!("opened subscription {} on '{}'", subscriber_id, path);
        Ok(Subscription::new(receiver, token))
    }

    async fn create_document(&self, path: &CollectionPath, fields: DocumentFields) -> Result<DocId> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LecternError::write(path.to_string(), "platform is offline"));
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LecternError::write(path.to_string(), "write rejected"));
        }

        let doc_id = DocId::generate();
        let mut collections = self.collections.lock().await;
        let state = collections.entry(path.to_string()).or_default();
        state.docs.push(RawDocument::new(doc_id.clone(), fields));

        let snapshot = SnapshotEvent::Snapshot(state.docs.clone());
        fan_out(state, snapshot);

        tracing::debug!("created document {} in '{}'", doc_id, path);
        Ok(doc_id)
    }
}
