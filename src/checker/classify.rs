// src/checker/classify.rs
// =============================================================================
// This module decides what kind of link an href is.
//
// Every link ends up in exactly one bucket:
// - Skip: nothing to verify (empty, mailto:, javascript:, menu toggles, ...)
// - Internal: a file inside the build directory
// - External: a URL we have to ask a remote server about
//
// One special case: an absolute URL that points back at the site we are
// verifying (its own published mirror) is rewritten to a plain path and
// checked on disk like any other internal link.
// =============================================================================

use crate::checker::html::LinkOccurrence;
use crate::config::{SiteConfig, VerifyConfig};
use serde::Serialize;
use url::Url;

/// Schemes that never point at something we can verify
const SKIPPED_SCHEMES: &[&str] = &["mailto:", "javascript:", "data:", "tel:", "sms:", "ftp:"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// href="" or only whitespace
    Empty,
    /// href="#" on a dropdown toggle
    MenuTrigger,
    /// mailto:, javascript:, data:, ...
    Scheme,
    /// href="#" while anchor verification is off
    BareFragment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Skip(SkipReason),
    /// A link to a file in the build directory.
    /// `rewritten_from` holds the original absolute URL when the link
    /// pointed at our own published site and was turned into a path.
    Internal {
        href: String,
        rewritten_from: Option<String>,
    },
    /// A link to somewhere else on the web; protocol-relative URLs
    /// already carry an `https:` scheme here.
    External { url: String },
}

// Classifies one link occurrence
//
// The order of checks matters:
//   1. empty hrefs
//   2. "#" menu toggles (before any fragment handling)
//   3. non-navigating schemes
//   4. "#" when anchors are not verified
//   5. absolute URLs (with the own-site rewrite)
//   6. everything else is internal
pub fn classify(link: &LinkOccurrence, config: &VerifyConfig) -> Classification {
    let href = link.href.trim();

    if href.is_empty() {
        return Classification::Skip(SkipReason::Empty);
    }

    if href == "#" && link.menu_trigger {
        return Classification::Skip(SkipReason::MenuTrigger);
    }

    if has_skipped_scheme(href) {
        return Classification::Skip(SkipReason::Scheme);
    }

    if href == "#" && !config.verify_anchors {
        return Classification::Skip(SkipReason::BareFragment);
    }

    if let Some(url) = absolute_url(href) {
        if let Some(path) = rewrite_own_site(&url, &config.site) {
            return Classification::Internal {
                href: path,
                rewritten_from: Some(url),
            };
        }
        return Classification::External { url };
    }

    Classification::Internal {
        href: href.to_string(),
        rewritten_from: None,
    }
}

fn has_skipped_scheme(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

// Returns the URL with a scheme if href is absolute, None otherwise
//
// Examples:
//   "https://example.com/a" -> Some("https://example.com/a")
//   "//cdn.example.com/x"   -> Some("https://cdn.example.com/x")
//   "/docs/intro"           -> None
pub fn absolute_url(href: &str) -> Option<String> {
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(href.to_string())
    } else if href.starts_with("//") {
        Some(format!("https:{}", href))
    } else {
        None
    }
}

// Turns a link to our own published site into a path-only href
//
// Both conditions must hold:
//   - the host ends with one of the configured mirror hosts
//   - the path is the base path or lies under it
//
// Example (mirror "me.github.io", base path "/repo"):
//   "https://me.github.io/repo/docs/x#y" -> Some("/docs/x#y")
fn rewrite_own_site(url: &str, site: &SiteConfig) -> Option<String> {
    if site.mirror_hosts.is_empty() {
        return None;
    }

    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();

    let host_matches = site
        .mirror_hosts
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .any(|mirror| !mirror.is_empty() && host.ends_with(&mirror));
    if !host_matches {
        return None;
    }

    let base = site.normalized_base_path();
    let path = parsed.path();
    let rest = if base.is_empty() {
        path
    } else if path == base {
        ""
    } else {
        path.strip_prefix(&base).filter(|rest| rest.starts_with('/'))?
    };

    let mut rewritten = if rest.is_empty() {
        "/".to_string()
    } else {
        rest.to_string()
    };
    if let Some(query) = parsed.query() {
        rewritten.push('?');
        rewritten.push_str(query);
    }
    if let Some(fragment) = parsed.fragment() {
        rewritten.push('#');
        rewritten.push_str(fragment);
    }

    Some(rewritten)
}
