//! Topic-Sieve: a same-site crawler that keeps only on-topic pages
//!
//! This crate crawls a web site breadth-first from a seed URL, stays on the
//! seed's host, asks an external classifier whether each page is about a
//! configured topic, and writes relevant page text to a content-addressed
//! store exactly once.

pub mod classifier;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Topic-Sieve operations
///
/// Only startup failures surface through this type. Everything that goes
/// wrong while handling an individual page is recorded as a
/// [`state::PageOutcome`] instead.
#[derive(Debug, Error)]
pub enum SieveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StoreError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Errors raised while fetching a page
///
/// A response with a non-2xx status is not a `FetchError`; the status is
/// handed back to the caller, which decides what to do with it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

/// Errors raised by a classifier backend
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Classifier request failed: {0}")]
    Transport(String),

    #[error("Classifier endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Malformed classifier response: {0}")]
    Response(String),
}

/// Result type alias for Topic-Sieve operations
pub type Result<T> = std::result::Result<T, SieveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, Frontier, StopHandle};
pub use output::{CrawlReport, StopReason};
pub use state::PageOutcome;
pub use url::{extract_host, normalize_url};
