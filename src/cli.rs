// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things). Every flag can also be
// set through an environment variable (the `env` attribute).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - Derive macros: Automatically generate code for our types
// =============================================================================

use crate::config::{default_user_agent, SiteConfig, VerifyConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "doc-link-guardian",
    version,
    about = "Verify every link inside a statically-built documentation site",
    long_about = "doc-link-guardian scans the HTML output of a documentation build and checks \
                  every link: internal paths and #anchors on disk, external URLs over HTTP. \
                  It exits with 1 when broken links are found, which makes it a good CI gate."
)]
pub struct Cli {
    /// Show debug logs (LINK_GUARDIAN_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify all links in a built site
    ///
    /// Example: doc-link-guardian check docs/build --site-host me.github.io --base-path /repo
    Check(CheckArgs),

    /// Probe a single external URL with the same HEAD/GET/retry policy
    ///
    /// Example: doc-link-guardian url https://www.rust-lang.org
    Url {
        /// URL to check
        url: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        network: NetworkArgs,
    },
}

/// Network settings shared by both subcommands
#[derive(Args, Debug, Clone)]
pub struct NetworkArgs {
    /// Seconds to wait for each network request
    #[arg(long, default_value_t = 10.0, env = "LINK_GUARDIAN_TIMEOUT")]
    pub timeout: f64,

    /// Attempts per external URL
    #[arg(long, default_value_t = 3, env = "LINK_GUARDIAN_RETRIES")]
    pub retries: u32,

    /// Seconds of backoff; attempt N waits N * backoff before the next one
    #[arg(long, default_value_t = 1.0, env = "LINK_GUARDIAN_BACKOFF")]
    pub backoff: f64,

    /// User-Agent header sent with every request
    #[arg(long, env = "LINK_GUARDIAN_USER_AGENT")]
    pub user_agent: Option<String>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Directory containing the built site (absolute links resolve here)
    pub build_dir: PathBuf,

    /// Only check these HTML files instead of every file in BUILD_DIR
    #[arg(long = "file", value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Maximum number of external checks in flight
    #[arg(short = 'w', long, default_value_t = 10, env = "LINK_GUARDIAN_WORKERS")]
    pub workers: usize,

    /// Do not check external links
    #[arg(long, conflicts_with = "only_external")]
    pub skip_external: bool,

    /// Only check external links
    #[arg(long)]
    pub only_external: bool,

    /// Do not verify #anchors inside documents
    #[arg(long)]
    pub no_anchors: bool,

    /// Host the site is published on; absolute links to it are checked on disk
    /// (repeatable)
    #[arg(long = "site-host", value_name = "HOST", env = "LINK_GUARDIAN_SITE_HOST", value_delimiter = ',')]
    pub site_hosts: Vec<String>,

    /// Path prefix the site is published under, e.g. /my-repo
    #[arg(long, default_value = "", env = "LINK_GUARDIAN_BASE_PATH")]
    pub base_path: String,

    /// First path segment of generated documentation pages
    #[arg(long, default_value = "docs")]
    pub content_root: String,

    /// Write the full report as JSON to FILE ("-" for stdout)
    #[arg(long, value_name = "FILE")]
    pub json: Option<String>,

    /// Write broken links as CSV to FILE
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    #[command(flatten)]
    pub network: NetworkArgs,
}

/// Shortest request timeout accepted from the command line
const MIN_TIMEOUT: Duration = Duration::from_millis(100);

impl NetworkArgs {
    // Fills the network part of a config
    //
    // Negative or NaN seconds from the command line fall back to zero;
    // the timeout never goes below MIN_TIMEOUT.
    pub fn apply(&self, config: &mut VerifyConfig) {
        config.timeout = seconds(self.timeout).max(MIN_TIMEOUT);
        config.retries = self.retries;
        config.backoff = seconds(self.backoff);
        config.user_agent = self.user_agent.clone().unwrap_or_else(default_user_agent);
    }
}

impl CheckArgs {
    /// Builds the engine configuration from the parsed flags
    pub fn to_config(&self) -> VerifyConfig {
        let mut config = VerifyConfig {
            build_root: self.build_dir.clone(),
            max_workers: self.workers,
            verify_anchors: !self.no_anchors,
            skip_external: self.skip_external,
            only_external: self.only_external,
            site: SiteConfig {
                mirror_hosts: self.site_hosts.clone(),
                base_path: self.base_path.clone(),
                content_root: self.content_root.clone(),
            },
            ..VerifyConfig::default()
        };
        self.network.apply(&mut config);
        config
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[command(flatten)] do?
//    - It copies the fields of another Args struct into this command
//    - NetworkArgs is shared by `check` and `url` without repeating it
//
// 2. What is value_delimiter = ','?
//    - `--site-host a.io,b.io` becomes vec!["a.io", "b.io"]
//    - The flag can also be given several times
//
// 3. Why f64 for seconds?
//    - It allows `--backoff 0.5`; Duration::try_from_secs_f64 converts it
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_args_to_config() {
        let cli = Cli::parse_from([
            "doc-link-guardian",
            "check",
            "site",
            "--workers",
            "4",
            "--no-anchors",
            "--site-host",
            "me.github.io",
            "--base-path",
            "/repo",
            "--timeout",
            "2.5",
            "--backoff",
            "0.5",
        ]);

        let Commands::Check(args) = cli.command else {
            panic!("expected check subcommand");
        };
        let config = args.to_config();
        assert_eq!(config.build_root, PathBuf::from("site"));
        assert_eq!(config.max_workers, 4);
        assert!(!config.verify_anchors);
        assert_eq!(config.site.mirror_hosts, vec!["me.github.io".to_string()]);
        assert_eq!(config.site.normalized_base_path(), "/repo");
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.backoff, Duration::from_millis(500));
        assert_eq!(config.retries, 3);
    }

    #[test]
    fn test_skip_and_only_external_conflict() {
        let result = Cli::try_parse_from([
            "doc-link-guardian",
            "check",
            "site",
            "--skip-external",
            "--only-external",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_timeout_is_raised_to_floor() {
        for value in ["0", "-3", "0.01"] {
            let flag = format!("--timeout={}", value);
            let cli = Cli::parse_from(["doc-link-guardian", "url", "https://a.example", flag.as_str()]);
            let Commands::Url { network, .. } = cli.command else {
                panic!("expected url subcommand");
            };
            let mut config = VerifyConfig::default();
            network.apply(&mut config);
            assert_eq!(config.timeout, MIN_TIMEOUT, "{}", value);
        }
    }

    #[test]
    fn test_negative_seconds_become_zero() {
        assert_eq!(seconds(-1.0), Duration::ZERO);
        assert_eq!(seconds(f64::NAN), Duration::ZERO);
    }
}
