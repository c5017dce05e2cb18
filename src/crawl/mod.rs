// src/crawl/mod.rs
// =============================================================================
// This module finds the documents to verify.
//
// There is no network crawling: the set of pages is exactly the HTML files
// in the build directory. Links are never followed to discover more pages.
// =============================================================================

mod walk;

// Re-export the discovery function
pub use walk::discover_html_files;
