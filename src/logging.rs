// src/logging.rs
// =============================================================================
// Sets up tracing output for the CLI.
//
// Log lines go to stderr so that `--json -` output on stdout stays valid.
// The filter comes from LINK_GUARDIAN_LOG, e.g.
//
//     LINK_GUARDIAN_LOG=doc_link_guardian=debug doc-link-guardian check build/
//
// and falls back to info (or debug with --verbose) for this crate only.
// =============================================================================

use std::sync::Once;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "LINK_GUARDIAN_LOG";

static INIT: Once = Once::new();

/// Installs the global subscriber. Calling it again is a no-op.
pub fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let fallback = if verbose {
            "doc_link_guardian=debug"
        } else {
            "doc_link_guardian=info"
        };
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(filter)
            .init();
    });
}
