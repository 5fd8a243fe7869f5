//! Worker pool for crawls with more than one worker
//!
//! Workers share the frontier and the report behind one mutex. A worker that
//! finds the queue empty while other pages are still in flight waits for
//! them to finish, since they may discover new links. The pool ends when the
//! queue is empty and nothing is in flight, or when a boundary check fails.
//!
//! Every reachable page is still visited at most once, but pages are no
//! longer guaranteed to finish in discovery order.

use crate::crawler::coordinator::{boundary_reason, politeness_pause, CrawlSettings};
use crate::crawler::frontier::Frontier;
use crate::crawler::pipeline::Pipeline;
use crate::crawler::stop::StopHandle;
use crate::output::{CrawlReport, StopReason};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::Notify;
use url::Url;

struct Shared {
    frontier: Frontier,
    in_flight: usize,
    report: CrawlReport,
}

struct PoolState {
    shared: Mutex<Shared>,
    claimed: AtomicUsize,
    wake: Notify,
    pipeline: Pipeline,
    scope: Url,
    settings: CrawlSettings,
    stop: StopHandle,
    started: Instant,
}

impl PoolState {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Holds one in-flight slot; releasing it wakes waiting workers
///
/// Released on drop, so a worker that panics mid-page still lets the others
/// see the frontier drain.
struct InFlight<'a> {
    state: &'a PoolState,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.lock().in_flight -= 1;
        self.state.wake.notify_waiters();
    }
}

enum Claim {
    Page(Url),
    Wait,
    Done(StopReason),
}

/// Runs the crawl with `settings.workers` concurrent workers
pub(crate) async fn run_pool(
    frontier: Frontier,
    pipeline: Pipeline,
    settings: CrawlSettings,
    stop: StopHandle,
) -> CrawlReport {
    let workers = settings.workers;
    let state = Arc::new(PoolState {
        scope: frontier.scope().clone(),
        shared: Mutex::new(Shared {
            frontier,
            in_flight: 0,
            report: CrawlReport::new(),
        }),
        claimed: AtomicUsize::new(0),
        wake: Notify::new(),
        pipeline,
        settings,
        stop,
        started: Instant::now(),
    });

    let handles: Vec<_> = (0..workers)
        .map(|id| tokio::spawn(worker(id, Arc::clone(&state))))
        .collect();

    let mut reason = StopReason::FrontierExhausted;
    for handle in handles {
        match handle.await {
            Ok(exit) if priority(exit) > priority(reason) => reason = exit,
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Crawl worker panicked"),
        }
    }

    let mut report = std::mem::take(&mut state.lock().report);
    report.finish(reason, state.started.elapsed());
    report
}

async fn worker(id: usize, state: Arc<PoolState>) -> StopReason {
    tracing::debug!(worker = id, "Worker started");

    loop {
        let notified = state.wake.notified();

        let claim = {
            let mut shared = state.lock();
            let claimed = state.claimed.load(Ordering::SeqCst);
            if let Some(reason) = boundary_reason(&state.stop, &state.settings, state.started, claimed) {
                Claim::Done(reason)
            } else if let Some(url) = shared.frontier.next() {
                state.claimed.fetch_add(1, Ordering::SeqCst);
                shared.in_flight += 1;
                Claim::Page(url)
            } else if shared.in_flight == 0 {
                Claim::Done(StopReason::FrontierExhausted)
            } else {
                Claim::Wait
            }
        };

        let url = match claim {
            Claim::Page(url) => url,
            Claim::Wait => {
                tokio::select! {
                    _ = notified => {}
                    _ = state.stop.stopped() => {}
                }
                continue;
            }
            Claim::Done(reason) => {
                tracing::debug!(worker = id, reason = reason.as_str(), "Worker finished");
                state.wake.notify_waiters();
                return reason;
            }
        };

        let slot = InFlight { state: &state };

        let result = state
            .pipeline
            .process(&url, |target| state.lock().frontier.mark_visited(target))
            .await;

        {
            let mut shared = state.lock();
            shared.report.record_visit(url.as_str(), result.outcome);
            for link in &result.links {
                let enqueued = shared.frontier.enqueue(link, &state.scope);
                shared.report.record_link(enqueued);
            }
        }
        drop(slot);

        politeness_pause(state.settings.politeness_delay, &state.stop).await;
    }
}

/// Rank used to pick the pool's stop reason from its workers' exits
fn priority(reason: StopReason) -> u8 {
    match reason {
        StopReason::FrontierExhausted => 0,
        StopReason::BudgetExhausted => 1,
        StopReason::DeadlineReached => 2,
        StopReason::Stopped => 3,
    }
}
