// src/engine/scheduler.rs
// =============================================================================
// Runs external probes concurrently over a bounded worker pool.
//
// This is the only place where real parallelism happens:
// - the URL list is deduplicated first (one probe per URL)
// - at most `max_workers` probes are in flight at any time
// - results are collected as they complete, not in submission order
// - a probe that panics becomes a failed result for that URL only
//
// Each probe runs in its own tokio task, so one slow host sleeping through
// its backoff never blocks the other workers.
//
// Rust concepts:
// - buffer_unordered: run up to N futures at once, yield in completion order
// - tokio::spawn + JoinHandle: a panic in the task surfaces as a JoinError
// - AtomicBool: a flag shared between threads without a lock
// - Notify: wakes tasks that are sleeping until the flag is raised
// =============================================================================

use crate::checker::http::ExternalCheckResult;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Tells the scheduler to stop handing out new work.
///
/// Probes already running finish their current attempt; URLs that have not
/// started yet are left out of the results.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<StopState>);

#[derive(Debug, Default)]
struct StopState {
    raised: AtomicBool,
    notify: Notify,
}

impl StopSignal {
    pub fn new() -> Self {
        StopSignal::default()
    }

    pub fn stop(&self) {
        self.0.raised.store(true, Ordering::SeqCst);
        self.0.notify.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        self.0.raised.load(Ordering::SeqCst)
    }

    /// Resolves once the signal is raised (immediately if it already was)
    pub async fn stopped(&self) {
        loop {
            // Register before checking the flag so a stop() in between is not lost
            let notified = self.0.notify.notified();
            if self.is_stopped() {
                return;
            }
            notified.await;
        }
    }
}

// Probes every unique URL with at most `max_workers` in flight
//
// Parameters:
//   urls: URLs to check (duplicates are checked once)
//   max_workers: upper bound on concurrent probes (0 is treated as 1)
//   probe_fn: builds the probe future for one URL
//   stop: raised on interrupt; pending URLs are then skipped
//
// Returns: one result per URL that was actually probed
pub async fn run_concurrently<F, Fut>(
    urls: Vec<String>,
    max_workers: usize,
    probe_fn: F,
    stop: &StopSignal,
) -> HashMap<String, ExternalCheckResult>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = ExternalCheckResult> + Send + 'static,
{
    let unique = dedupe(urls);
    let workers = max_workers.max(1);
    debug!(urls = unique.len(), workers, "dispatching external probes");

    let mut completed = stream::iter(unique)
        .map(|url| {
            // Futures are lazy: building it here does not start the request
            let probe = probe_fn(url.clone());
            let stop = stop.clone();
            async move {
                if stop.is_stopped() {
                    return None;
                }
                let result = match tokio::spawn(probe).await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(url = %url, error = %e, "probe task failed");
                        ExternalCheckResult::failed(format!("Probe task failed: {}", e))
                    }
                };
                Some((url, result))
            }
        })
        .buffer_unordered(workers);

    let mut results = HashMap::new();
    while let Some(item) = completed.next().await {
        if let Some((url, result)) = item {
            results.insert(url, result);
        }
    }
    results
}

// Removes duplicate URLs, keeping the first occurrence of each
fn dedupe(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|url| seen.insert(url.clone())).collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why spawn inside buffer_unordered?
//    - buffer_unordered alone polls all futures on the current task
//    - tokio::spawn gives every probe its own task, so a panic is caught as
//      a JoinError instead of tearing down the whole stream
//
// 2. Why is the stop check inside the async block?
//    - buffer_unordered only pulls the next future when a slot is free
//    - checking at that moment means URLs still waiting for a slot are
//      dropped, while running probes are left alone
// -----------------------------------------------------------------------------
