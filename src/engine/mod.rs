// src/engine/mod.rs
// =============================================================================
// This module runs a whole verification pass.
//
// Submodules:
// - cache: URL -> external result memo shared by all workers
// - scheduler: bounded worker pool for external probes
// - stats: counters, broken-link records and their synchronized accumulator
// - verify: the phase-by-phase orchestration (Verifier)
// =============================================================================

pub mod cache;
pub mod scheduler;
pub mod stats;
pub mod verify;

pub use cache::ResultCache;
pub use scheduler::{run_concurrently, StopSignal};
pub use stats::{BrokenLinkRecord, LinkKind, Tally, VerificationReport, VerificationStats};
pub use verify::Verifier;
