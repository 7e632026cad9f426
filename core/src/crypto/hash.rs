// Content hashing for message deduplication

use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Produces the digest used as the dedup key for a payload.
///
/// Implementations must be deterministic: the same payload always yields the
/// same digest for the lifetime of the process. Digests are also persisted, so
/// switching hasher for an existing storage key makes old entries unreachable.
#[async_trait]
pub trait MessageHasher: Send + Sync {
    async fn hash(&self, payload: &str) -> Result<String, String>;
}

/// Lowercase hex SHA-256 (64 chars). The default hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

#[async_trait]
impl MessageHasher for Sha256Hasher {
    async fn hash(&self, payload: &str) -> Result<String, String> {
        let digest = Sha256::digest(payload.as_bytes());
        Ok(hex::encode(digest))
    }
}

/// Lowercase hex BLAKE3 (64 chars)
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

#[async_trait]
impl MessageHasher for Blake3Hasher {
    async fn hash(&self, payload: &str) -> Result<String, String> {
        let digest = blake3::hash(payload.as_bytes());
        Ok(hex::encode(digest.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sha256_known_vector() {
        let digest = Sha256Hasher.hash("hello").await.unwrap();
        assert_eq!(
            digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[tokio::test]
    async fn test_sha256_is_deterministic() {
        let a = Sha256Hasher.hash("same payload").await.unwrap();
        let b = Sha256Hasher.hash("same payload").await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Sha256Hasher.hash("other payload").await.unwrap());
    }

    #[tokio::test]
    async fn test_blake3_hex_length() {
        let digest = Blake3Hasher.hash("hello").await.unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(digest, Sha256Hasher.hash("hello").await.unwrap());
    }
}
