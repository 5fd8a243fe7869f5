//! Storage traits and error types
//!
//! This module defines the trait interface for content store backends and
//! the key type they are addressed by.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Content-addressed key for a stored page
///
/// The digest is the hex-encoded SHA-256 of the normalized URL, so the same
/// page maps to the same key in every run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    digest: String,
    url: String,
}

impl StoreKey {
    /// Derives the key for a (normalized) URL
    pub fn for_url(url: &Url) -> Self {
        let digest = hex::encode(Sha256::digest(url.as_str().as_bytes()));
        Self {
            digest,
            url: url.to_string(),
        }
    }

    /// Hex digest identifying the page
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// URL the key was derived from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Full object name below a store prefix, e.g. `funds/<digest>.txt`
    pub fn object_key(&self, prefix: &str) -> String {
        format!("{}{}.txt", prefix, self.digest)
    }
}

/// Result of a conditional write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOutcome {
    /// True if this call wrote the payload, false if the key already existed
    pub written: bool,
}

impl StoreOutcome {
    pub fn written() -> Self {
        Self { written: true }
    }

    pub fn already_present() -> Self {
        Self { written: false }
    }
}

/// Trait for content store implementations
///
/// Writes are write-once: the first payload stored under a key wins, and
/// every later call for the same key reports `written = false` without
/// touching the stored data.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Writes `payload` under `key` unless the key is already present
    async fn store_if_absent(&self, key: &StoreKey, payload: &str) -> StoreResult<StoreOutcome>;

    /// Returns true if a payload is stored under `key`
    async fn contains(&self, key: &StoreKey) -> StoreResult<bool>;

    /// Short backend name used in log lines
    fn name(&self) -> &'static str;
}
