// src/lib.rs
// =============================================================================
// doc-link-guardian: verifies every link in a statically-built docs site.
//
// Modules:
// - checker: per-link logic (extract, classify, resolve paths, anchors, HTTP)
// - engine: cache, worker pool, statistics and the orchestrating Verifier
// - crawl: finds the HTML files of a build
// - report: text / JSON / CSV presentation
// - cli, config, error, logging: the ambient pieces around them
// =============================================================================

pub mod checker;
pub mod cli;
pub mod config;
pub mod crawl;
pub mod engine;
pub mod error;
pub mod logging;
pub mod report;

pub use checker::{classify, Classification, ExternalCheckResult, HttpProbe, LinkOccurrence, Probe};
pub use config::{SiteConfig, VerifyConfig};
pub use engine::{
    BrokenLinkRecord, LinkKind, ResultCache, StopSignal, VerificationReport, VerificationStats,
    Verifier,
};
pub use error::VerifyError;

