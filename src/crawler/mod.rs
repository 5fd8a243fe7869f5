//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - HTML text and link extraction
//! - The FIFO frontier that keeps the crawl on one host
//! - The per-page pipeline and the crawl loop around it

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod pipeline;
mod pool;
mod stop;

pub use coordinator::{CrawlSettings, Crawler};
pub use fetcher::{build_http_client, FetchedPage, Fetcher, HttpFetcher};
pub use frontier::{Enqueue, Frontier};
pub use parser::{extract_links, extract_text, parse_html, ParsedPage};
pub use pipeline::{PageResult, Pipeline};
pub use stop::StopHandle;

use crate::config::Config;
use crate::output::CrawlReport;
use crate::SieveError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP fetcher and the classifier client
/// 2. Open the content store
/// 3. Crawl from the seed until the frontier, the budget or the deadline
///    runs out
///
/// # Arguments
///
/// * `config` - The validated run configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl ran; per-page failures are in the report
/// * `Err(SieveError)` - Startup failed
pub async fn crawl(config: &Config) -> Result<CrawlReport, SieveError> {
    let crawler = Crawler::from_config(config)?;
    Ok(crawler.run().await)
}
