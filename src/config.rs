// src/config.rs
// =============================================================================
// Run configuration for the verification engine.
//
// Two pieces:
// - SiteConfig: who "we" are (published hosts, base path, docs root segment)
// - VerifyConfig: the knobs of a run (timeouts, workers, retries, flags)
//
// The CLI fills these in from flags; tests build them directly.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

/// Identity of the site being verified.
///
/// An absolute link whose host ends with one of `mirror_hosts` and whose path
/// lives under `base_path` points back at this very site, so it is checked on
/// disk instead of over the network.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Hosts the site is published on, e.g. `example.github.io`
    pub mirror_hosts: Vec<String>,
    /// Path prefix of the published site, e.g. `/my-repo` (empty = served at `/`)
    pub base_path: String,
    /// First path segment under which generated docs live, e.g. `docs`
    pub content_root: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            mirror_hosts: Vec::new(),
            base_path: String::new(),
            content_root: "docs".to_string(),
        }
    }
}

impl SiteConfig {
    /// Base path with exactly one leading slash and no trailing slash.
    /// Returns an empty string when the site is served from the host root.
    pub fn normalized_base_path(&self) -> String {
        let trimmed = self.base_path.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }

    /// `/<content_root>/`, the prefix used by generated documentation pages
    pub fn content_prefix(&self) -> String {
        format!("/{}/", self.content_root.trim_matches('/'))
    }
}

/// Everything a single verification run needs to know.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Directory containing the built site; absolute hrefs resolve against it
    pub build_root: PathBuf,
    /// Timeout for one network request
    pub timeout: Duration,
    /// Maximum number of external probes in flight
    pub max_workers: usize,
    /// Number of attempts per external URL
    pub retries: u32,
    /// Base delay between attempts; attempt N waits `N * backoff`
    pub backoff: Duration,
    /// Check `#fragment` parts against the target document
    pub verify_anchors: bool,
    /// Do not probe external links at all
    pub skip_external: bool,
    /// Only probe external links; internal links are skipped
    pub only_external: bool,
    /// User-Agent sent with every probe
    pub user_agent: String,
    pub site: SiteConfig,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        VerifyConfig {
            build_root: PathBuf::from("."),
            timeout: Duration::from_secs(10),
            max_workers: 10,
            retries: 3,
            backoff: Duration::from_secs(1),
            verify_anchors: true,
            skip_external: false,
            only_external: false,
            user_agent: default_user_agent(),
            site: SiteConfig::default(),
        }
    }
}

impl VerifyConfig {
    /// Creates a config for the given build directory with default knobs
    pub fn new(build_root: impl Into<PathBuf>) -> Self {
        VerifyConfig {
            build_root: build_root.into(),
            ..VerifyConfig::default()
        }
    }

    /// Attempts per URL, never less than one
    pub fn attempts(&self) -> u32 {
        self.retries.max(1)
    }

    /// Worker pool size, never less than one
    pub fn workers(&self) -> usize {
        self.max_workers.max(1)
    }
}

pub fn default_user_agent() -> String {
    format!(
        "{}/{} (documentation link verifier)",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}
