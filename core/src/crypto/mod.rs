// Crypto module — content digests used as dedup keys

pub mod hash;

pub use hash::{Blake3Hasher, MessageHasher, Sha256Hasher};
