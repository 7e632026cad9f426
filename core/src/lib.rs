// Topicstore Core — per-topic message deduplication
//
// Remembers which payloads were already seen on each topic, keyed by content
// digest, and mirrors that index to durable storage so it survives restarts.

pub mod config;
pub mod crypto;
pub mod store;

use thiserror::Error;

pub use config::TrackerConfig;
pub use crypto::{Blake3Hasher, MessageHasher, Sha256Hasher};
pub use store::{
    KeyValueStorage, MemoryStorage, MessageRecord, MessageTracker, RestoreOutcome, SledStorage,
    Store, Topic, TrackerState,
};

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Hashing error: {0}")]
    Hashing(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

// ============================================================================
// LOGGING
// ============================================================================

/// Install a `tracing` subscriber for the host process.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used. Safe to call
/// more than once, later calls are ignored.
pub fn init_logging(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .try_init();
}
