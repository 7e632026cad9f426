// Message tracker — per-topic deduplication with a write-through durable mirror
//
// Every topic maps digest -> original payload. A payload is stored once per topic;
// repeats are answered from memory without touching storage.

use crate::config::TrackerConfig;
use crate::crypto::{MessageHasher, Sha256Hasher};
use crate::store::backend::{KeyValueStorage, MemoryStorage};
use crate::{Result, TrackerError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, trace, warn};

/// Logical channel identifier
pub type Topic = String;

/// Digest -> payload for every distinct message seen on one topic
pub type MessageRecord = HashMap<String, String>;

/// Topic -> record. This is the whole persisted state.
pub type Store = HashMap<Topic, MessageRecord>;

/// Result of the one-time restore performed by [`MessageTracker::init`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A durable value was found and loaded
    Restored { topics: usize },
    /// Nothing has ever been written under the storage key
    Empty,
    /// Read or decode failed; in-memory state was left untouched
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerState {
    /// Durable mirror not consulted yet
    Uninitialized,
    /// Restore attempted
    Ready(RestoreOutcome),
}

struct TrackerInner {
    config: TrackerConfig,
    storage_key: String,
    storage: Arc<dyn KeyValueStorage>,
    hasher: Arc<dyn MessageHasher>,
    messages: RwLock<Store>,
    state: RwLock<TrackerState>,
    /// Serializes check -> mutate -> write-through so mutators cannot lose updates
    writer: Mutex<()>,
}

/// Handle to one per-topic message store.
///
/// Cloning is cheap and every clone refers to the same store. Build one per
/// client session and pass it to whoever needs it.
#[derive(Clone)]
pub struct MessageTracker {
    inner: Arc<TrackerInner>,
}

impl MessageTracker {
    pub fn new(
        config: TrackerConfig,
        storage: Arc<dyn KeyValueStorage>,
        hasher: Arc<dyn MessageHasher>,
    ) -> Self {
        let storage_key = config.storage_key();
        Self {
            inner: Arc::new(TrackerInner {
                config,
                storage_key,
                storage,
                hasher,
                messages: RwLock::new(HashMap::new()),
                state: RwLock::new(TrackerState::Uninitialized),
                writer: Mutex::new(()),
            }),
        }
    }

    /// Tracker backed by a fresh [`MemoryStorage`] and SHA-256 digests
    pub fn in_memory(config: TrackerConfig) -> Self {
        Self::new(
            config,
            Arc::new(MemoryStorage::new()),
            Arc::new(Sha256Hasher),
        )
    }

    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    pub fn context(&self) -> &str {
        &self.inner.config.context
    }

    pub fn state(&self) -> TrackerState {
        self.inner.state.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.inner.state.read(), TrackerState::Ready(_))
    }

    /// Restore the durable mirror into memory.
    ///
    /// Never fails: a failed restore is logged and reported through the
    /// returned outcome, and the tracker starts from whatever it already held.
    /// Only the first call restores; later calls return the first outcome.
    pub async fn init(&self) -> RestoreOutcome {
        let _guard = self.inner.writer.lock().await;

        if let Some(outcome) = self.restore_outcome() {
            warn!("{} tracker already initialized, skipping restore", self.context());
            return outcome;
        }

        trace!(context = %self.context(), "Initialized");
        self.ensure_restored().await
    }

    /// Record `payload` on `topic` and return its digest.
    ///
    /// A payload already recorded for the topic is a no-op: the digest is
    /// returned and storage is not touched. Otherwise the whole store is
    /// written through before returning.
    ///
    /// If the write-through fails the error is returned but the in-memory
    /// entry stays, so memory is ahead of storage until the next successful
    /// write-through.
    ///
    /// Called before [`MessageTracker::init`], the durable mirror is restored
    /// first so the write-through cannot drop what earlier sessions stored.
    pub async fn set(&self, topic: &str, payload: &str) -> Result<String> {
        let hash = self.hash(payload).await?;
        let _guard = self.inner.writer.lock().await;
        self.ensure_restored().await;

        {
            let mut messages = self.inner.messages.write();
            let record = messages.entry(topic.to_string()).or_default();
            if record.contains_key(&hash) {
                return Ok(hash);
            }
            record.insert(hash.clone(), payload.to_string());
        }

        self.persist().await?;
        Ok(hash)
    }

    /// Messages recorded for `topic`, empty if the topic is unknown
    pub fn get(&self, topic: &str) -> MessageRecord {
        self.inner
            .messages
            .read()
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether `payload` was already recorded for `topic`
    pub async fn has(&self, topic: &str, payload: &str) -> Result<bool> {
        let hash = self.hash(payload).await?;
        Ok(self
            .inner
            .messages
            .read()
            .get(topic)
            .is_some_and(|record| record.contains_key(&hash)))
    }

    /// Forget `topic` and everything recorded for it.
    ///
    /// Unknown topics still write the (unchanged) store through. Same
    /// divergence window as [`MessageTracker::set`] on write failure, and the
    /// same implicit restore when called before [`MessageTracker::init`].
    pub async fn del(&self, topic: &str) -> Result<()> {
        let _guard = self.inner.writer.lock().await;
        self.ensure_restored().await;
        self.inner.messages.write().remove(topic);
        self.persist().await
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.inner.messages.read().keys().cloned().collect()
    }

    /// Copy of the full in-memory store
    pub fn snapshot(&self) -> Store {
        self.inner.messages.read().clone()
    }

    // ---------- Private ----------

    fn restore_outcome(&self) -> Option<RestoreOutcome> {
        match &*self.inner.state.read() {
            TrackerState::Ready(outcome) => Some(outcome.clone()),
            TrackerState::Uninitialized => None,
        }
    }

    /// Run the one-time restore if it has not happened yet.
    /// Caller must hold the writer lock.
    async fn ensure_restored(&self) -> RestoreOutcome {
        if let Some(outcome) = self.restore_outcome() {
            return outcome;
        }
        let outcome = self.restore().await;
        *self.inner.state.write() = TrackerState::Ready(outcome.clone());
        outcome
    }

    async fn hash(&self, payload: &str) -> Result<String> {
        self.inner
            .hasher
            .hash(payload)
            .await
            .map_err(TrackerError::Hashing)
    }

    async fn persist(&self) -> Result<()> {
        let bytes = {
            let messages = self.inner.messages.read();
            serde_json::to_vec(&*messages)
        }
        .map_err(|e| TrackerError::Serialization(e.to_string()))?;

        self.inner
            .storage
            .set_item(&self.inner.storage_key, bytes)
            .await
            .map_err(TrackerError::Storage)?;
        debug!("Persisted records for {}", self.context());
        Ok(())
    }

    async fn read_durable(&self) -> Result<Option<Store>> {
        let bytes = self
            .inner
            .storage
            .get_item(&self.inner.storage_key)
            .await
            .map_err(TrackerError::Storage)?;

        match bytes {
            Some(bytes) => {
                let store: Store = serde_json::from_slice(&bytes)
                    .map_err(|e| TrackerError::Serialization(e.to_string()))?;
                Ok(Some(store))
            }
            None => Ok(None),
        }
    }

    async fn restore(&self) -> RestoreOutcome {
        match self.read_durable().await {
            Ok(Some(store)) => {
                let topics = store.len();
                *self.inner.messages.write() = store;
                debug!("Successfully restored records for {}", self.context());
                trace!(method = "restore", size = topics);
                RestoreOutcome::Restored { topics }
            }
            Ok(None) => {
                debug!("No stored records for {}", self.context());
                RestoreOutcome::Empty
            }
            Err(e) => {
                debug!("Failed to restore records for {}", self.context());
                error!("{}", e);
                RestoreOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
