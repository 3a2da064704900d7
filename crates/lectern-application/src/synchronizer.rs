//! Live view synchronization.
//!
//! The synchronizer maintains two independent live views (lessons, chat) by
//! opening one subscription per collection and reducing each stream's
//! snapshots into a locally ordered list. Each snapshot fully replaces the
//! corresponding view; observers never see a partially updated list, and a
//! stream error leaves the previous view intact.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use lectern_core::chat::{self, ChatMessage};
use lectern_core::collection::{CollectionKind, CollectionPath};
use lectern_core::config::AppConfig;
use lectern_core::document::RawDocument;
use lectern_core::error::Result;
use lectern_core::lesson::{self, Lesson};
use lectern_core::platform::{Platform, SnapshotEvent, SubscriptionGuard};

/// One running subscription: its platform-side guard, the reducer task, and
/// a stop token that ends the reducer even if the stream never closes.
struct StreamHandle {
    guard: SubscriptionGuard,
    stop: CancellationToken,
    task: JoinHandle<()>,
}

struct ActiveStreams {
    lessons: StreamHandle,
    chat: StreamHandle,
}

/// Maintains the two synchronized view-state sequences.
///
/// The views are exposed as `watch` receivers: each holds the sorted
/// projection of the last full snapshot received, and is only ever replaced
/// atomically by its own reducer task.
pub struct Synchronizer {
    platform: Arc<dyn Platform>,
    lessons_path: CollectionPath,
    chat_path: CollectionPath,
    lessons_view: watch::Sender<Vec<Lesson>>,
    chat_view: watch::Sender<Vec<ChatMessage>>,
    active: Mutex<Option<ActiveStreams>>,
}

impl Synchronizer {
    pub fn new(platform: Arc<dyn Platform>, config: &AppConfig) -> Self {
        let (lessons_view, _) = watch::channel(Vec::new());
        let (chat_view, _) = watch::channel(Vec::new());
        Self {
            platform,
            lessons_path: config.collection_path(CollectionKind::Lessons),
            chat_path: config.collection_path(CollectionKind::Chat),
            lessons_view,
            chat_view,
            active: Mutex::new(None),
        }
    }

    /// Read-only handle to the lessons view, newest first.
    pub fn lessons(&self) -> watch::Receiver<Vec<Lesson>> {
        self.lessons_view.subscribe()
    }

    /// Read-only handle to the chat view, oldest first.
    pub fn messages(&self) -> watch::Receiver<Vec<ChatMessage>> {
        self.chat_view.subscribe()
    }

    /// Opens exactly one subscription per tracked collection and starts the
    /// reducer tasks. Calling `start` while already running is a no-op, so a
    /// re-signaled readiness never leaks a duplicate subscription.
    ///
    /// # Errors
    ///
    /// Returns the subscription error when either collection cannot be
    /// opened; in that case nothing stays subscribed.
    pub async fn start(&self) -> Result<()> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            tracing::debug!("synchronizer already running");
            return Ok(());
        }

        let lessons_sub = self.platform.subscribe(&self.lessons_path).await?;
        let chat_sub = match self.platform.subscribe(&self.chat_path).await {
            Ok(sub) => sub,
            Err(err) => {
                lessons_sub.unsubscribe();
                return Err(err);
            }
        };

        let (lessons_events, lessons_guard) = lessons_sub.into_parts();
        let (chat_events, chat_guard) = chat_sub.into_parts();

        let lessons = spawn_reducer(
            lessons_events,
            lessons_guard,
            self.lessons_view.clone(),
            Lesson::from_document,
            lesson::sort_newest_first,
            CollectionKind::Lessons.as_str(),
        );
        let chat = spawn_reducer(
            chat_events,
            chat_guard,
            self.chat_view.clone(),
            ChatMessage::from_document,
            chat::sort_oldest_first,
            CollectionKind::Chat.as_str(),
        );

        *active = Some(ActiveStreams { lessons, chat });
        tracing::info!("synchronizer started");
        Ok(())
    }

    /// Releases both subscriptions and stops the reducer tasks.
    ///
    /// Safe to call when not running; the platform-side unsubscribe of each
    /// stream is observed exactly once. The views keep their last contents.
    pub async fn shutdown(&self) {
        let streams = self.active.lock().await.take();
        let Some(streams) = streams else {
            return;
        };
        for handle in [streams.lessons, streams.chat] {
            handle.guard.unsubscribe();
            handle.stop.cancel();
            let _ = handle.task.await;
        }
        tracing::info!("synchronizer stopped");
    }

    /// Ties the synchronizer's lifecycle to a readiness signal: started when
    /// readiness becomes true, shut down when it reverts or the signal's
    /// sender goes away. Readiness being re-signaled is harmless because
    /// [`start`](Self::start) is idempotent.
    pub fn drive(self: Arc<Self>, mut readiness: watch::Receiver<bool>) -> JoinHandle<()> {
        let sync = self;
        tokio::spawn(async move {
            loop {
                let ready = *readiness.borrow_and_update();
                if ready {
                    if let Err(err) = sync.start().await {
                        tracing::warn!("failed to start synchronizer: {}", err);
                    }
                } else {
                    sync.shutdown().await;
                }
                if readiness.changed().await.is_err() {
                    break;
                }
            }
            sync.shutdown().await;
        })
    }
}

/// Spawns the single-consumer reducer for one subscription stream.
///
/// Every snapshot is materialized, sorted, and atomically swapped into the
/// view. Stream errors are logged and leave the previous view in place.
fn spawn_reducer<T, M, S>(
    mut events: mpsc::Receiver<SnapshotEvent>,
    guard: SubscriptionGuard,
    view: watch::Sender<Vec<T>>,
    materialize: M,
    sort: S,
    collection: &'static str,
) -> StreamHandle
where
    T: Send + Sync + 'static,
    M: Fn(&RawDocument) -> T + Send + 'static,
    S: Fn(&mut [T]) + Send + 'static,
{
    let stop = CancellationToken::new();
    let reducer_stop = stop.clone();
    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = reducer_stop.cancelled() => break,
                event = events.recv() => match event {
                    Some(SnapshotEvent::Snapshot(docs)) => {
                        let mut items: Vec<T> = docs.iter().map(|doc| materialize(doc)).collect();
                        sort(items.as_mut_slice());
                        tracing::debug!(
                            "applied snapshot of {} documents to '{}'",
                            items.len(),
                            collection
                        );
                        view.send_replace(items);
                    }
                    Some(SnapshotEvent::StreamError(message)) => {
                        // Stale-but-present beats silently cleared.
                        tracing::warn!("subscription stream error on '{}': {}", collection, message);
                    }
                    None => {
                        tracing::debug!("subscription stream for '{}' closed", collection);
                        break;
                    }
                },
            }
        }
    });
    StreamHandle { guard, stop, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use lectern_core::document::DocId;
    use lectern_infrastructure::MemoryPlatform;
    use std::time::Duration;

    fn config() -> AppConfig {
        AppConfig::default()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    async fn wait_for_len<T: Clone + Send + Sync>(rx: &mut watch::Receiver<Vec<T>>, len: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if rx.borrow_and_update().len() == len {
                    return;
                }
                rx.changed().await.expect("view channel closed");
            }
        })
        .await
        .expect("view did not reach the expected length");
    }

    async fn wait_for_unsubscribes(platform: &MemoryPlatform, count: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while platform.unsubscribe_count() != count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("unsubscribe count did not settle");
    }

    async fn post_lesson(platform: &MemoryPlatform, path: &CollectionPath, title: &str, hour: u32) {
        platform
            .create_document(path, Lesson::to_fields(title, "body", "author", at(hour)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_lessons_view_is_sorted_newest_first() {
        let platform = Arc::new(MemoryPlatform::new());
        let config = config();
        let lessons_path = config.collection_path(CollectionKind::Lessons);
        post_lesson(&platform, &lessons_path, "early", 8).await;
        post_lesson(&platform, &lessons_path, "late", 15).await;
        post_lesson(&platform, &lessons_path, "mid", 11).await;

        let sync = Synchronizer::new(platform.clone(), &config);
        sync.start().await.unwrap();
        let mut lessons = sync.lessons();
        wait_for_len(&mut lessons, 3).await;

        let view = lessons.borrow().clone();
        let titles: Vec<&str> = view.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, ["late", "mid", "early"]);

        // Bijection with the stored snapshot: same count, same ids.
        let stored: Vec<DocId> = platform
            .documents(&lessons_path)
            .await
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(view.len(), stored.len());
        for lesson in &view {
            assert!(stored.contains(&lesson.id));
        }
    }

    #[tokio::test]
    async fn test_chat_view_is_sorted_oldest_first() {
        let platform = Arc::new(MemoryPlatform::new());
        let config = config();
        let chat_path = config.collection_path(CollectionKind::Chat);
        for (text, hour) in [("second", 10), ("first", 9), ("third", 12)] {
            platform
                .create_document(&chat_path, ChatMessage::to_fields(text, "author", at(hour)))
                .await
                .unwrap();
        }

        let sync = Synchronizer::new(platform.clone(), &config);
        sync.start().await.unwrap();
        let mut messages = sync.messages();
        wait_for_len(&mut messages, 3).await;

        let texts: Vec<String> = messages.borrow().iter().map(|m| m.text.clone()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let platform = Arc::new(MemoryPlatform::new());
        let config = config();
        let sync = Synchronizer::new(platform.clone(), &config);

        sync.start().await.unwrap();
        sync.start().await.unwrap();

        let lessons_path = config.collection_path(CollectionKind::Lessons);
        let chat_path = config.collection_path(CollectionKind::Chat);
        assert_eq!(platform.subscriber_count(&lessons_path).await, 1);
        assert_eq!(platform.subscriber_count(&chat_path).await, 1);
    }

    #[tokio::test]
    async fn test_shutdown_unsubscribes_both_streams_once() {
        let platform = Arc::new(MemoryPlatform::new());
        let config = config();
        let sync = Synchronizer::new(platform.clone(), &config);

        sync.start().await.unwrap();
        sync.shutdown().await;
        wait_for_unsubscribes(&platform, 2).await;

        // A second shutdown is a no-op.
        sync.shutdown().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(platform.unsubscribe_count(), 2);
    }

    #[tokio::test]
    async fn test_stream_error_retains_previous_view() {
        let platform = Arc::new(MemoryPlatform::new());
        let config = config();
        let lessons_path = config.collection_path(CollectionKind::Lessons);
        post_lesson(&platform, &lessons_path, "kept", 9).await;

        let sync = Synchronizer::new(platform.clone(), &config);
        sync.start().await.unwrap();
        let mut lessons = sync.lessons();
        wait_for_len(&mut lessons, 1).await;

        platform
            .emit_stream_error(&lessons_path, "transient failure")
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        let view = lessons.borrow().clone();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].title, "kept");

        // The stream stays live after the error.
        post_lesson(&platform, &lessons_path, "next", 10).await;
        wait_for_len(&mut lessons, 2).await;
    }

    #[tokio::test]
    async fn test_drive_follows_readiness_signal() {
        let platform = Arc::new(MemoryPlatform::new());
        let config = config();
        let lessons_path = config.collection_path(CollectionKind::Lessons);
        let sync = Arc::new(Synchronizer::new(platform.clone(), &config));
        let (readiness, readiness_rx) = watch::channel(false);
        let driver = Arc::clone(&sync).drive(readiness_rx);

        async fn wait_for_subscribers(
            platform: &MemoryPlatform,
            path: &CollectionPath,
            count: usize,
        ) {
            tokio::time::timeout(Duration::from_secs(2), async {
                while platform.subscriber_count(path).await != count {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            })
            .await
            .expect("subscriber count did not settle");
        }

        readiness.send_replace(true);
        wait_for_subscribers(&platform, &lessons_path, 1).await;

        // Re-signaling readiness does not open a second pair.
        readiness.send_replace(true);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(platform.subscriber_count(&lessons_path).await, 1);

        // Reverting readiness releases the subscriptions.
        readiness.send_replace(false);
        wait_for_subscribers(&platform, &lessons_path, 0).await;
        wait_for_unsubscribes(&platform, 2).await;

        // Re-entering readiness re-subscribes without leaking.
        readiness.send_replace(true);
        wait_for_subscribers(&platform, &lessons_path, 1).await;

        drop(readiness);
        let _ = driver.await;
        wait_for_unsubscribes(&platform, 4).await;
    }
}
