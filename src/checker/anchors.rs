// src/checker/anchors.rs
// =============================================================================
// This module checks whether a `#fragment` exists inside a page.
//
// Site generators derive heading ids in slightly different ways, so matching
// is a list of strategies tried in a fixed order. The first one that hits
// wins and its reason is reported:
//
//   1. an element with id == fragment                 "Anchor id found"
//   2. a legacy <a name="fragment">                    "Named anchor found"
//   3. an element with id == normalize(fragment)       "Normalized anchor id found"
//   4. a heading whose normalized text matches         "Heading slug matches anchor"
//
// Steps 1-3 run for the raw fragment and then for its percent-decoded form
// (fragments can contain encoded emoji). Step 4 runs last.
// =============================================================================

use crate::checker::html::selector;
use crate::error::{Result, VerifyError};
use percent_encoding::percent_decode_str;
use scraper::Html;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const ANCHOR_ID_FOUND: &str = "Anchor id found";
pub const NAMED_ANCHOR_FOUND: &str = "Named anchor found";
pub const NORMALIZED_ID_FOUND: &str = "Normalized anchor id found";
pub const HEADING_SLUG_MATCH: &str = "Heading slug matches anchor";
pub const EMPTY_FRAGMENT: &str = "Empty fragment refers to the top of the document";
pub const ANCHOR_NOT_FOUND: &str = "Anchor not found in file";

/// Outcome of looking up one fragment in one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorCheckResult {
    pub matched: bool,
    pub reason: String,
}

impl AnchorCheckResult {
    fn hit(reason: &str) -> Self {
        AnchorCheckResult {
            matched: true,
            reason: reason.to_string(),
        }
    }

    fn miss() -> Self {
        AnchorCheckResult {
            matched: false,
            reason: ANCHOR_NOT_FOUND.to_string(),
        }
    }
}

/// Every anchor target a document offers, extracted once per file.
///
/// `scraper::Html` is not `Send`, so we keep plain strings instead of the
/// parsed DOM. That also makes the index cheap to cache per file.
#[derive(Debug, Clone, Default)]
pub struct AnchorIndex {
    ids: HashSet<String>,
    names: HashSet<String>,
    heading_slugs: HashSet<String>,
}

impl AnchorIndex {
    /// Builds the index from HTML source
    pub fn from_html(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);
        let mut index = AnchorIndex::default();

        for element in document.select(&selector("[id]")?) {
            if let Some(id) = element.value().attr("id") {
                index.ids.insert(id.to_string());
            }
        }

        for element in document.select(&selector("a[name]")?) {
            if let Some(name) = element.value().attr("name") {
                index.names.insert(name.to_string());
            }
        }

        for element in document.select(&selector("h1, h2, h3, h4, h5, h6")?) {
            let text: String = element.text().collect();
            let slug = normalize_anchor(&text);
            if !slug.is_empty() {
                index.heading_slugs.insert(slug);
            }
        }

        Ok(index)
    }

    /// Reads and indexes a file.
    ///
    /// A missing file is reported as `VerifyError::MissingFile`, which callers
    /// must keep apart from "anchor not found".
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => VerifyError::MissingFile(path.to_path_buf()),
            _ => VerifyError::io(path, e),
        })?;
        // Legacy pages may not be UTF-8
        AnchorIndex::from_html(&String::from_utf8_lossy(&bytes))
    }

    /// Runs the matching strategies in order and returns the first hit
    pub fn find(&self, fragment: &str) -> AnchorCheckResult {
        if fragment.is_empty() {
            return AnchorCheckResult::hit(EMPTY_FRAGMENT);
        }

        let forms = fragment_forms(fragment);

        for form in &forms {
            if self.ids.contains(form) {
                return AnchorCheckResult::hit(ANCHOR_ID_FOUND);
            }
            if self.names.contains(form) {
                return AnchorCheckResult::hit(NAMED_ANCHOR_FOUND);
            }
            if self.ids.contains(&normalize_anchor(form)) {
                return AnchorCheckResult::hit(NORMALIZED_ID_FOUND);
            }
        }

        for form in &forms {
            let slug = normalize_anchor(form);
            if !slug.is_empty() && self.heading_slugs.contains(&slug) {
                return AnchorCheckResult::hit(HEADING_SLUG_MATCH);
            }
        }

        AnchorCheckResult::miss()
    }
}

// Checks whether `fragment` resolves inside the file at `path`
//
// Returns Err(VerifyError::MissingFile) if the file does not exist at all.
pub fn has_anchor(path: &Path, fragment: &str) -> Result<AnchorCheckResult> {
    Ok(AnchorIndex::load(path)?.find(fragment))
}

// Normalizes text into a slug the way static site generators usually do:
// lower-case, spaces become hyphens, anything outside [a-z0-9-] is dropped.
//
// Examples:
//   "My Heading"      -> "my-heading"
//   "What's new?"     -> "whats-new"
//   "  Step 1: Setup" -> "step-1-setup"
pub fn normalize_anchor(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

// The raw fragment, plus its percent-decoded form when that differs
fn fragment_forms(fragment: &str) -> Vec<String> {
    let mut forms = vec![fragment.to_string()];
    let decoded = percent_decode_str(fragment).decode_utf8_lossy();
    if decoded != fragment {
        forms.push(decoded.into_owned());
    }
    forms
}
