// Store module — per-topic message tracking and its durable mirror

pub mod backend;
pub mod tracker;

pub use backend::{KeyValueStorage, MemoryStorage, SledStorage};
pub use tracker::{MessageRecord, MessageTracker, RestoreOutcome, Store, Topic, TrackerState};
