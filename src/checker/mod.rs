// src/checker/mod.rs
// =============================================================================
// This module contains the per-link checking logic.
//
// Submodules:
// - html: Extracts <a href> occurrences from built pages
// - classify: Decides whether a link is skipped, internal or external
// - paths: Turns internal hrefs into candidate files on disk
// - anchors: Verifies #fragments against ids and headings
// - http: Probes external URLs (HEAD, GET fallback, retries)
//
// None of these know about concurrency or statistics; the engine module
// wires them together.
// =============================================================================

pub mod anchors;
pub mod classify;
pub mod html;
pub mod http;
pub mod paths;

pub use anchors::{has_anchor, normalize_anchor, AnchorCheckResult, AnchorIndex};
pub use classify::{classify, Classification, SkipReason};
pub use html::{extract_html_links, LinkOccurrence};
pub use http::{ExternalCheckResult, HttpProbe, Probe};
pub use paths::{resolve_candidates, split_href, suggest_fix};
