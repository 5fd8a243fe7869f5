//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the frontier to the page
//! pipeline:
//! - Checking the stop handle, the run deadline and the page budget at every
//!   iteration boundary
//! - Handing each popped URL to the pipeline
//! - Feeding discovered links back into the frontier
//! - Pausing between pages
//!
//! With more than one worker configured the loop is replaced by the worker
//! pool in [`super::pool`].

use crate::classifier::{AgentClassifier, Classifier};
use crate::config::{Config, CrawlConfig};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::pipeline::Pipeline;
use crate::crawler::pool;
use crate::crawler::stop::StopHandle;
use crate::output::{CrawlReport, StopReason};
use crate::storage::{open_store, ContentStore};
use crate::{SieveError, UrlError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Limits and pacing for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Pages to process before stopping
    pub max_pages: usize,
    /// Pause between consecutive pages
    pub politeness_delay: Duration,
    /// Wall-clock limit for the whole run
    pub run_deadline: Option<Duration>,
    /// Number of concurrent workers; 1 means the sequential loop
    pub workers: usize,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_pages: 50,
            politeness_delay: Duration::from_secs(1),
            run_deadline: None,
            workers: 1,
        }
    }
}

impl From<&CrawlConfig> for CrawlSettings {
    fn from(config: &CrawlConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            politeness_delay: config.politeness_delay(),
            run_deadline: config.run_deadline(),
            workers: config.workers.max(1),
        }
    }
}

/// The crawl engine
///
/// All crawl state (frontier, budget, stop flag) lives in one instance, so
/// two crawlers never share anything but the collaborators they were given.
pub struct Crawler {
    frontier: Frontier,
    pipeline: Pipeline,
    settings: CrawlSettings,
    stop: StopHandle,
}

impl Crawler {
    /// Creates a crawler seeded with `seed`
    ///
    /// # Arguments
    ///
    /// * `seed` - Absolute http(s) URL; its host bounds the crawl
    /// * `settings` - Budget, pacing and worker count
    /// * `fetcher` - Retrieves pages
    /// * `classifier` - Decides whether a page is on topic
    /// * `store` - Receives the text of on-topic pages
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(UrlError)` - The seed is not an absolute http(s) URL
    pub fn new(
        seed: &str,
        settings: CrawlSettings,
        fetcher: Arc<dyn Fetcher>,
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn ContentStore>,
    ) -> Result<Self, UrlError> {
        let frontier = Frontier::new(seed)?;
        let pipeline = Pipeline::new(fetcher, classifier, store, frontier.scope().clone());

        Ok(Self {
            frontier,
            pipeline,
            settings,
            stop: StopHandle::new(),
        })
    }

    /// Builds a crawler with the HTTP fetcher, the agent classifier and the
    /// configured store
    ///
    /// Failing to build either HTTP client or to open the store is fatal.
    pub fn from_config(config: &Config) -> Result<Self, SieveError> {
        let fetcher = Arc::new(HttpFetcher::new(&config.request)?);
        let classifier = Arc::new(AgentClassifier::new(
            config.classifier.clone(),
            config.request.timeout(),
        )?);
        let store = open_store(&config.store)?;

        tracing::info!(
            seed = %config.crawl.seed_url,
            store = store.name(),
            location = %config.store.location,
            topic = %config.classifier.topic,
            "Crawler initialized"
        );

        let crawler = Self::new(
            &config.crawl.seed_url,
            CrawlSettings::from(&config.crawl),
            fetcher,
            classifier,
            store,
        )?;
        Ok(crawler)
    }

    /// Returns a handle that stops this crawler at the next iteration boundary
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Runs the crawl to completion and returns its report
    ///
    /// Never fails: per-page errors are recorded in the report.
    pub async fn run(self) -> CrawlReport {
        tracing::info!(
            seed = %self.frontier.scope(),
            max_pages = self.settings.max_pages,
            workers = self.settings.workers,
            delay_ms = self.settings.politeness_delay.as_millis() as u64,
            "Starting crawl"
        );

        let report = if self.settings.workers > 1 {
            pool::run_pool(self.frontier, self.pipeline, self.settings, self.stop).await
        } else {
            self.run_sequential().await
        };

        tracing::info!(
            reason = report.stop_reason.map(|r| r.as_str()).unwrap_or(""),
            pages = report.pages_visited(),
            stored = report.stored(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Crawl finished"
        );

        report
    }

    async fn run_sequential(mut self) -> CrawlReport {
        let started = Instant::now();
        let scope = self.frontier.scope().clone();
        let mut report = CrawlReport::new();
        let mut processed = 0;

        let reason = loop {
            if let Some(reason) = boundary_reason(&self.stop, &self.settings, started, processed) {
                break reason;
            }

            let Some(url) = self.frontier.next() else {
                break StopReason::FrontierExhausted;
            };

            let frontier = &mut self.frontier;
            let result = self
                .pipeline
                .process(&url, |target| frontier.mark_visited(target))
                .await;
            report.record_visit(url.as_str(), result.outcome);

            for link in &result.links {
                report.record_link(self.frontier.enqueue(link, &scope));
            }

            processed += 1;

            if processed % 10 == 0 {
                tracing::info!(
                    pages = processed,
                    pending = self.frontier.pending_len(),
                    "Progress"
                );
            }

            if processed < self.settings.max_pages && !self.frontier.is_exhausted() {
                politeness_pause(self.settings.politeness_delay, &self.stop).await;
            }
        };

        report.finish(reason, started.elapsed());
        report
    }
}

/// Decides whether the run must end before claiming another page
///
/// A stop request wins over the deadline, which wins over the budget.
pub(crate) fn boundary_reason(
    stop: &StopHandle,
    settings: &CrawlSettings,
    started: Instant,
    processed: usize,
) -> Option<StopReason> {
    if stop.is_stopped() {
        return Some(StopReason::Stopped);
    }
    if settings
        .run_deadline
        .map(|deadline| started.elapsed() >= deadline)
        .unwrap_or(false)
    {
        return Some(StopReason::DeadlineReached);
    }
    if processed >= settings.max_pages {
        return Some(StopReason::BudgetExhausted);
    }
    None
}

/// Sleeps for `delay` unless a stop is requested first
pub(crate) async fn politeness_pause(delay: Duration, stop: &StopHandle) {
    if delay.is_zero() {
        return;
    }
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = stop.stopped() => {}
    }
}
