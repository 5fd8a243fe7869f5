//! Run report and statistics
//!
//! The report is the crawl's decision trace: one entry per visited page in
//! visitation order, plus counters that summarize the run.

use crate::crawler::Enqueue;
use crate::state::PageOutcome;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Duration;

/// Why the crawl loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No URL left to visit
    FrontierExhausted,
    /// `max-pages` pages were processed
    BudgetExhausted,
    /// A stop was requested through the stop handle
    Stopped,
    /// The run exceeded `max-run-seconds`
    DeadlineReached,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FrontierExhausted => "frontier_exhausted",
            Self::BudgetExhausted => "budget_exhausted",
            Self::Stopped => "stopped",
            Self::DeadlineReached => "deadline_reached",
        }
    }
}

/// One visited page and how it ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageVisit {
    pub url: String,
    pub outcome: PageOutcome,
}

/// Summary of one crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Visited pages in the order their processing finished
    pub visits: Vec<PageVisit>,

    /// Count of visits by outcome
    pub outcomes: BTreeMap<PageOutcome, u64>,

    /// Links appended to the frontier
    pub links_queued: u64,

    /// Links already visited or pending
    pub links_duplicate: u64,

    /// Links pointing off the crawl host
    pub links_out_of_scope: u64,

    /// Links that were malformed or not http(s)
    pub links_rejected: u64,

    /// Why the run ended; None while it is still running
    pub stop_reason: Option<StopReason>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one visited page
    pub fn record_visit(&mut self, url: &str, outcome: PageOutcome) {
        self.visits.push(PageVisit {
            url: url.to_string(),
            outcome,
        });
        *self.outcomes.entry(outcome).or_insert(0) += 1;
    }

    /// Records what the frontier did with one discovered link
    pub fn record_link(&mut self, result: Enqueue) {
        match result {
            Enqueue::Queued => self.links_queued += 1,
            Enqueue::Duplicate => self.links_duplicate += 1,
            Enqueue::OutOfScope => self.links_out_of_scope += 1,
            Enqueue::Rejected => self.links_rejected += 1,
        }
    }

    /// Marks the run as finished
    pub fn finish(&mut self, reason: StopReason, elapsed: Duration) {
        self.stop_reason = Some(reason);
        self.elapsed = elapsed;
    }

    /// Number of pages popped from the frontier and processed
    pub fn pages_visited(&self) -> usize {
        self.visits.len()
    }

    /// Number of visits that ended with `outcome`
    pub fn count(&self, outcome: PageOutcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Visited URLs in visitation order
    pub fn visited_urls(&self) -> Vec<&str> {
        self.visits.iter().map(|visit| visit.url.as_str()).collect()
    }

    /// Outcome recorded for `url`, if it was visited
    pub fn outcome_of(&self, url: &str) -> Option<PageOutcome> {
        self.visits
            .iter()
            .find(|visit| visit.url == url)
            .map(|visit| visit.outcome)
    }

    /// Pages newly written to the store during this run
    pub fn stored(&self) -> u64 {
        self.count(PageOutcome::Stored)
    }

    /// Pages judged relevant, stored now or earlier
    pub fn relevant(&self) -> u64 {
        self.sum_where(PageOutcome::is_relevant)
    }

    /// Pages that were fetched and had their links followed
    pub fn processed(&self) -> u64 {
        self.sum_where(PageOutcome::is_processed)
    }

    /// Pages dropped before classification
    pub fn skipped(&self) -> u64 {
        self.sum_where(PageOutcome::is_skipped)
    }

    fn sum_where(&self, keep: fn(&PageOutcome) -> bool) -> u64 {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| keep(*outcome))
            .map(|(_, count)| count)
            .sum()
    }

    /// Visits that ended in a collaborator error
    pub fn errors(&self) -> u64 {
        self.sum_where(PageOutcome::is_error)
    }
}

/// Renders a report as the human-readable summary printed after a run
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Crawl Summary ===\n");
    let _ = writeln!(
        out,
        "Stopped: {}",
        report.stop_reason.map(|r| r.as_str()).unwrap_or("running")
    );
    let _ = writeln!(out, "Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    let _ = writeln!(out, "Pages visited: {}", report.pages_visited());
    let _ = writeln!(out, "Processed: {}", report.processed());
    let _ = writeln!(out, "Skipped: {}", report.skipped());
    let _ = writeln!(out, "Relevant pages: {}", report.relevant());
    let _ = writeln!(out, "Newly stored: {}", report.stored());
    let _ = writeln!(out, "Errors: {}", report.errors());
    let _ = writeln!(out);

    let _ = writeln!(out, "Pages by Outcome:");
    let total = report.pages_visited();
    for outcome in PageOutcome::all() {
        let count = report.count(outcome);
        let percentage = if total > 0 {
            (count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let _ = writeln!(out, "  {}: {} ({:.1}%)", outcome, count, percentage);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Links:");
    let _ = writeln!(out, "  queued: {}", report.links_queued);
    let _ = writeln!(out, "  duplicate: {}", report.links_duplicate);
    let _ = writeln!(out, "  out of scope: {}", report.links_out_of_scope);
    let _ = writeln!(out, "  rejected: {}", report.links_rejected);

    out
}

/// Prints a report to stdout
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}
