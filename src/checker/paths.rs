// src/checker/paths.rs
// =============================================================================
// This module turns an internal href into files that might be its target.
//
// Static site generators are inconsistent about output layout: `/docs/guide`
// can be served from `docs/guide.html`, `docs/guide/index.html`, or even
// `guide.html` at the root. Instead of guessing one, we build an ordered list
// of candidates and let the caller pick the first one that exists.
//
// Candidate order (most specific first):
//   1. the path exactly as written
//   2. the path with `.html` appended
//   3. `index.html` inside the path, if it is a directory
//   4. `<root>/<slug>.html` and `<root>/<slug>/index.html` for `/docs/<slug>`
//
// Rust concepts:
// - Path/PathBuf: borrowed and owned filesystem paths (like &str/String)
// - LazyLock: compile the slug pattern once, on first use
// =============================================================================

use crate::config::SiteConfig;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

/// How many tried candidates appear in a "file not found" message
const MAX_REPORTED_CANDIDATES: usize = 6;

/// "01-intro", "2_setup": a doc slug with a numeric ordering prefix
static NUMBERED_SLUG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+[-_][A-Za-z0-9]").expect("valid numbered slug regex")
});

// Splits an href into its path and fragment parts
//
// The query string is dropped: it never changes which file is served.
//
// Examples:
//   "guide.html#setup" -> ("guide.html", Some("setup"))
//   "/docs/x?v=2"      -> ("/docs/x", None)
//   "#top"             -> ("", Some("top"))
pub fn split_href(href: &str) -> (&str, Option<&str>) {
    let (before_fragment, fragment) = match href.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (href, None),
    };
    let path = before_fragment
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(before_fragment);
    (path, fragment)
}

// Produces the ordered list of files an internal href could refer to
//
// Parameters:
//   href: the internal href (a fragment, if any, is ignored)
//   source: the document that contains the link
//   build_root: the directory of the built site
//   site: base path and content root used for rewrites
//
// Returns: candidates in priority order, without duplicates
pub fn resolve_candidates(
    href: &str,
    source: &Path,
    build_root: &Path,
    site: &SiteConfig,
) -> Vec<PathBuf> {
    let (raw_path, _) = split_href(href);
    let decoded = percent_decode_str(raw_path).decode_utf8_lossy();
    let path = strip_base_path(&decoded, site);

    let mut candidates = Vec::new();

    // Step 3: absolute paths hang off the build root, relative ones off the
    // directory of the page that contains them
    let is_absolute = path.starts_with('/');
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let base = if is_absolute {
        build_root.to_path_buf()
    } else {
        source.parent().map(Path::to_path_buf).unwrap_or_default()
    };
    let exact = normalize_lexically(&segments.iter().fold(base, |acc, s| acc.join(s)));
    candidates.push(exact);

    // Step 4: `.html` and `index.html` variants of everything so far
    let names_directory = segments.is_empty() || path.ends_with('/');
    for candidate in candidates.clone() {
        if !names_directory && !has_html_extension(&candidate) {
            candidates.push(with_html_suffix(&candidate));
        }
        if candidate.is_dir() {
            candidates.push(candidate.join("index.html"));
        }
    }

    // Step 5: content-root fallback for generators that flatten /docs/
    if let Some(slug) = path.strip_prefix(&site.content_prefix()) {
        let slug = slug.trim_matches('/');
        if !slug.is_empty() {
            candidates.push(normalize_lexically(&build_root.join(format!("{}.html", slug))));
            candidates.push(normalize_lexically(&build_root.join(slug).join("index.html")));
        }
    }

    dedupe_canonical(candidates)
}

/// Returns the first candidate that is an existing file
pub fn first_existing(candidates: &[PathBuf]) -> Option<&PathBuf> {
    candidates.iter().find(|c| c.is_file())
}

// Formats the "file not found" message with a bounded list of candidates
//
// Paths are shown relative to the build root when possible to keep the
// report readable.
pub fn describe_missing(candidates: &[PathBuf], build_root: &Path) -> String {
    let tried: Vec<String> = candidates
        .iter()
        .take(MAX_REPORTED_CANDIDATES)
        .map(|c| {
            c.strip_prefix(build_root)
                .unwrap_or(c)
                .display()
                .to_string()
        })
        .collect();

    if tried.is_empty() {
        "File not found".to_string()
    } else {
        format!("File not found (tried: {})", tried.join(", "))
    }
}

// Proposes a corrected href for a recognizably malformed internal link
//
// The pattern we know: a numbered doc slug ("01-intro", "/2_setup/x") that
// is missing the content root segment. The suggestion is advisory; the link
// is still reported as broken.
//
// Example (content root "docs"):
//   "/01-intro#goals" -> Some("/docs/01-intro#goals")
pub fn suggest_fix(href: &str, site: &SiteConfig) -> Option<String> {
    let (path, fragment) = split_href(href);
    let content_prefix = site.content_prefix();
    if path.starts_with(&content_prefix) {
        return None;
    }

    let trimmed = path.trim_start_matches("./").trim_start_matches('/');
    if !NUMBERED_SLUG.is_match(trimmed) {
        return None;
    }

    let mut suggestion = format!("{}{}", content_prefix, trimmed);
    if let Some(fragment) = fragment {
        suggestion.push('#');
        suggestion.push_str(fragment);
    }
    Some(suggestion)
}


// Removes the published base path so absolute paths line up with the
// build root ("/my-repo/docs/x" -> "/docs/x")
fn strip_base_path(path: &str, site: &SiteConfig) -> String {
    let base = site.normalized_base_path();
    if !base.is_empty() && path.starts_with(&base) {
        let rest = &path[base.len()..];
        if rest.is_empty() {
            return "/".to_string();
        }
        if rest.starts_with('/') {
            return rest.to_string();
        }
    }
    path.to_string()
}

fn has_html_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

fn with_html_suffix(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".html");
    PathBuf::from(name)
}

// Resolves "." and ".." without touching the filesystem
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// Drops candidates that point at the same file as an earlier one
//
// Existing paths are compared after resolving symlinks; missing ones by
// their lexical form.
fn dedupe_canonical(candidates: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| {
            let key = fs::canonicalize(c).unwrap_or_else(|_| c.clone());
            seen.insert(key)
        })
        .collect()
}
