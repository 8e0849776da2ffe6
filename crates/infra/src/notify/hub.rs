use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use remark_core::domain::comments::Comment;

use super::subscription::Subscription;

/// Slots per subscriber endpoint. A consumer lagging further behind misses
/// comments instead of stalling the publisher.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 10;

type Endpoints = HashMap<u64, mpsc::Sender<Comment>>;

struct HubInner {
    subscribers: RwLock<HashMap<String, Endpoints>>,
    next_id: AtomicU64,
    buffer: usize,
    shutdown: CancellationToken,
}

/// Registry of live subscriber endpoints keyed by post id.
///
/// Cloning is cheap and every clone shares the same registry; one hub is
/// created at startup and handed to whoever publishes or subscribes.
#[derive(Clone)]
pub struct CommentHub {
    inner: Arc<HubInner>,
}

impl Default for CommentHub {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_BUFFER)
    }
}

impl CommentHub {
    pub fn new(buffer: usize) -> Self {
        Self {
            inner: Arc::new(HubInner {
                subscribers: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                buffer: buffer.max(1),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Registers a new endpoint for `post_id`.
    ///
    /// The endpoint is unregistered and closed once, by a watcher task, when
    /// `cancel` fires, when the returned handle is dropped, or when the hub
    /// shuts down, whichever comes first.
    pub async fn subscribe(&self, cancel: &CancellationToken, post_id: &str) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(self.inner.buffer);
        let token = cancel.child_token();

        self.inner
            .subscribers
            .write()
            .await
            .entry(post_id.to_string())
            .or_default()
            .insert(id, sender);
        debug!(post_id, subscriber = id, "subscriber registered");

        let hub = self.clone();
        let watch = token.clone();
        let post = post_id.to_string();
        tokio::spawn(async move {
            tokio::select! {
                _ = watch.cancelled() => {}
                _ = hub.inner.shutdown.cancelled() => {}
            }
            hub.unregister(&post, id).await;
        });

        Subscription::new(post_id.to_string(), receiver, token)
    }

    /// Hands `comment` to every endpoint currently registered for `post_id`.
    /// Endpoints with a full buffer skip it; nothing is reported back.
    pub async fn publish(&self, post_id: &str, comment: &Comment) {
        let subscribers = self.inner.subscribers.read().await;
        let Some(endpoints) = subscribers.get(post_id) else {
            return;
        };
        for (id, sender) in endpoints {
            match sender.try_send(comment.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    debug!(post_id, subscriber = *id, comment_id = %comment.id, "subscriber buffer full; comment dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    trace!(post_id, subscriber = *id, "subscriber closed before unregister");
                }
            }
        }
    }

    pub async fn subscriber_count(&self, post_id: &str) -> usize {
        self.inner
            .subscribers
            .read()
            .await
            .get(post_id)
            .map_or(0, HashMap::len)
    }

    pub async fn total_subscribers(&self) -> usize {
        self.inner
            .subscribers
            .read()
            .await
            .values()
            .map(HashMap::len)
            .sum()
    }

    /// Closes every endpoint. Subscribing afterwards yields endpoints that are
    /// closed straight away.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        let mut subscribers = self.inner.subscribers.write().await;
        let closed: usize = subscribers.values().map(HashMap::len).sum();
        subscribers.clear();
        debug!(closed, "comment hub shut down");
    }

    async fn unregister(&self, post_id: &str, id: u64) {
        let mut subscribers = self.inner.subscribers.write().await;
        let Some(endpoints) = subscribers.get_mut(post_id) else {
            return;
        };
        // dropping the sender closes the endpoint
        if endpoints.remove(&id).is_some() {
            debug!(post_id, subscriber = id, "subscriber unregistered");
        }
        if endpoints.is_empty() {
            subscribers.remove(post_id);
        }
    }
}

impl std::fmt::Debug for CommentHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentHub")
            .field("buffer", &self.inner.buffer)
            .field("shut_down", &self.inner.shutdown.is_cancelled())
            .finish()
    }
}
