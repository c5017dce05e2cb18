// src/checker/html.rs
// =============================================================================
// This module extracts links from built HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Unlike a crawler we do NOT resolve hrefs into absolute URLs here. The raw
// href is kept exactly as written, together with the document it came from,
// so the classifier and the path resolver can interpret it later.
//
// Rust concepts:
// - Result<T, E>: For operations that can fail
// - Iterators: For processing collections
// - Closures: Anonymous functions (|x| ...)
// =============================================================================

use crate::error::{Result, VerifyError};
use scraper::{ElementRef, Html, Selector};
use std::path::{Path, PathBuf};

/// One `<a href>` found while scanning a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOccurrence {
    /// The href exactly as written in the page
    pub href: String,
    /// The document the link was found in
    pub source: PathBuf,
    /// The tag only opens a menu (aria-haspopup / role="button")
    pub menu_trigger: bool,
}

impl LinkOccurrence {
    pub fn new(href: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        LinkOccurrence {
            href: href.into(),
            source: source.into(),
            menu_trigger: false,
        }
    }
}

/// Parses a CSS selector, turning the parse error into our error type
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| VerifyError::Selector(format!("{}: {}", css, e)))
}

// Extracts all links from HTML content
//
// Parameters:
//   html: the HTML content to parse (borrowed as &str)
//   source: the path of the document (recorded on every occurrence)
//
// Returns: one LinkOccurrence per <a href> in document order
//
// Example:
//   html = "<a href='/docs'>Docs</a>"
//   result = [LinkOccurrence { href: "/docs", .. }]
pub fn extract_html_links(html: &str, source: &Path) -> Result<Vec<LinkOccurrence>> {
    let document = Html::parse_document(html);
    let anchors = selector("a[href]")?;

    let links = document
        .select(&anchors)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            Some(LinkOccurrence {
                href: href.trim().to_string(),
                source: source.to_path_buf(),
                menu_trigger: is_menu_trigger(&element),
            })
        })
        .collect();

    Ok(links)
}

// Checks whether an anchor tag is just a dropdown toggle
//
// Navigation bars often render `<a href="#" aria-haspopup="true">` or
// `<a href="#" role="button">` to open a menu. Those never navigate.
fn is_menu_trigger(element: &ElementRef) -> bool {
    let value = element.value();

    let has_popup = value
        .attr("aria-haspopup")
        .map(|v| !v.trim().eq_ignore_ascii_case("false"))
        .unwrap_or(false);

    let is_button = value
        .attr("role")
        .map(|v| v.trim().eq_ignore_ascii_case("button"))
        .unwrap_or(false);

    has_popup || is_button
}
