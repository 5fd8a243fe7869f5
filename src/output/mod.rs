//! Output module for crawl run reports
//!
//! This module handles:
//! - Recording what happened to every visited page during a run
//! - Counting discovered links by what the frontier did with them
//! - Rendering an end-of-run summary

pub mod stats;

pub use stats::{format_report, print_report, CrawlReport, PageVisit, StopReason};
