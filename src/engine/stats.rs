// src/engine/stats.rs
// =============================================================================
// The report model and the synchronized accumulator that builds it.
//
// Counters and broken-link records are written from the engine and, after
// external probing starts, from code that runs next to concurrent workers.
// All of it lives behind one Mutex inside `Tally`; nothing else holds a
// mutable reference to the aggregation state.
//
// Counters only ever go up. `snapshot()` copies the final state out once all
// work is done.
// =============================================================================

use crate::checker::http::ExternalCheckResult;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Number of source documents kept per broken external URL
pub const MAX_SAMPLE_SOURCES: usize = 3;

/// Aggregate counts for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationStats {
    pub total_files: usize,
    pub total_links: usize,
    pub internal_links: usize,
    pub external_links: usize,
    pub skipped_links: usize,
    pub working_links: usize,
    pub broken_links: usize,
    /// External links never probed because the run was interrupted
    pub unchecked_links: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Internal,
    External,
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkKind::Internal => write!(f, "internal"),
            LinkKind::External => write!(f, "external"),
        }
    }
}

/// One failing link, ready for the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLinkRecord {
    pub url: String,
    pub kind: LinkKind,
    /// Documents containing the link (a sample for external links)
    pub sources: Vec<PathBuf>,
    /// How many times the link occurred across all documents
    pub occurrences: usize,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl BrokenLinkRecord {
    pub fn internal(url: impl Into<String>, source: &Path, error: impl Into<String>) -> Self {
        BrokenLinkRecord {
            url: url.into(),
            kind: LinkKind::Internal,
            sources: vec![source.to_path_buf()],
            occurrences: 1,
            error: error.into(),
            status_code: None,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }
}

/// Everything the reporting layer needs after a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    pub stats: VerificationStats,
    pub broken: Vec<BrokenLinkRecord>,
    /// External URLs that answered with a status below 400
    pub working_external: Vec<String>,
}

impl VerificationReport {
    /// The only signal a CLI needs for its exit code
    pub fn has_broken(&self) -> bool {
        self.stats.broken_links > 0
    }
}

/// Which counter a classified link occurrence increments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counted {
    Skipped,
    Internal,
    External,
}

#[derive(Debug, Default)]
struct TallyState {
    stats: VerificationStats,
    broken: Vec<BrokenLinkRecord>,
    // url -> position in `broken`, for grouping external failures
    external_records: HashMap<String, usize>,
    working_external: Vec<String>,
    working_seen: HashSet<String>,
}

/// Mutex-guarded accumulator for statistics and broken-link records.
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    state: Arc<Mutex<TallyState>>,
}

impl Tally {
    pub fn new() -> Self {
        Tally::default()
    }

    // A panic while holding the lock leaves plain counters behind, which are
    // still valid, so a poisoned lock is simply taken over
    fn lock(&self) -> MutexGuard<'_, TallyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_file(&self) {
        self.lock().stats.total_files += 1;
    }

    /// Counts one link occurrence in exactly one category
    pub fn count_link(&self, counted: Counted) {
        let mut state = self.lock();
        state.stats.total_links += 1;
        match counted {
            Counted::Skipped => state.stats.skipped_links += 1,
            Counted::Internal => state.stats.internal_links += 1,
            Counted::External => state.stats.external_links += 1,
        }
    }

    pub fn internal_ok(&self) {
        self.lock().stats.working_links += 1;
    }

    pub fn internal_broken(&self, record: BrokenLinkRecord) {
        let mut state = self.lock();
        state.stats.broken_links += 1;
        state.broken.push(record);
    }

    /// Folds one external occurrence and its (shared) probe result
    pub fn external_result(&self, url: &str, source: &Path, result: &ExternalCheckResult) {
        let mut state = self.lock();

        if result.reachable {
            state.stats.working_links += 1;
            if state.working_seen.insert(url.to_string()) {
                state.working_external.push(url.to_string());
            }
            return;
        }

        state.stats.broken_links += 1;
        match state.external_records.get(url).copied() {
            Some(position) => {
                if let Some(record) = state.broken.get_mut(position) {
                    record.occurrences += 1;
                    let source = source.to_path_buf();
                    if record.sources.len() < MAX_SAMPLE_SOURCES && !record.sources.contains(&source) {
                        record.sources.push(source);
                    }
                }
            }
            None => {
                let position = state.broken.len();
                state.broken.push(BrokenLinkRecord {
                    url: url.to_string(),
                    kind: LinkKind::External,
                    sources: vec![source.to_path_buf()],
                    occurrences: 1,
                    error: result.message.clone(),
                    status_code: result.status_code,
                    suggestion: None,
                });
                state.external_records.insert(url.to_string(), position);
            }
        }
    }

    pub fn external_unchecked(&self) {
        self.lock().stats.unchecked_links += 1;
    }

    pub fn stats(&self) -> VerificationStats {
        self.lock().stats.clone()
    }

    /// Copies the current state into a report
    pub fn snapshot(&self) -> VerificationReport {
        let state = self.lock();
        VerificationReport {
            stats: state.stats.clone(),
            broken: state.broken.clone(),
            working_external: state.working_external.clone(),
        }
    }
}
