//! State module for tracking what happened to each visited page
//!
//! # Components
//!
//! - `PageOutcome`: the terminal outcome of one crawl iteration (stored,
//!   skipped as irrelevant, failed to fetch, ...)

mod page_outcome;

// Re-export main types
pub use page_outcome::PageOutcome;
