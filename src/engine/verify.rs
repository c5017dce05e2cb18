// src/engine/verify.rs
// =============================================================================
// The verification engine: walks a run through its phases.
//
//   Scanning            read every document, extract <a href> occurrences
//   Classifying         skip / internal / external, count each occurrence
//   ResolvingInternal   candidate paths, then anchors (inline, no threads)
//   DispatchingExternal dedupe, consult the cache, probe the rest in parallel
//   Aggregating         fold every external occurrence into the tally
//   Done                hand the report to the caller
//
// A document that cannot be read is skipped with a warning; a URL whose probe
// fails in any way becomes a broken record. Nothing in a single document or
// host can abort the whole run.
// =============================================================================

use crate::checker::anchors::{AnchorCheckResult, AnchorIndex};
use crate::checker::classify::{classify, Classification};
use crate::checker::html::{extract_html_links, LinkOccurrence};
use crate::checker::http::{HttpProbe, Probe};
use crate::checker::paths::{
    describe_missing, first_existing, resolve_candidates, split_href, suggest_fix,
};
use crate::config::{SiteConfig, VerifyConfig};
use crate::engine::cache::ResultCache;
use crate::engine::scheduler::{run_concurrently, StopSignal};
use crate::engine::stats::{BrokenLinkRecord, Counted, Tally, VerificationReport};
use crate::error::{Result, VerifyError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Scanning,
    Classifying,
    ResolvingInternal,
    DispatchingExternal,
    Aggregating,
    Done,
}

fn enter(phase: Phase) {
    debug!(?phase, "entering phase");
}

// An internal link waiting to be resolved
struct InternalLink {
    href: String,
    source: PathBuf,
    rewritten_from: Option<String>,
}

// An external link occurrence waiting for its probe result
struct ExternalLink {
    url: String,
    source: PathBuf,
}

/// Orchestrates classification, internal resolution and external probing
pub struct Verifier<P> {
    config: VerifyConfig,
    probe: Arc<P>,
    cache: ResultCache,
    stop: StopSignal,
}

impl Verifier<HttpProbe> {
    /// A verifier that probes external links over real HTTP
    ///
    /// `stop` both halts dispatch and ends the retries of probes in flight.
    pub fn with_http(config: VerifyConfig, stop: StopSignal) -> Result<Self> {
        let probe = HttpProbe::new(&config)?.with_stop_signal(stop.clone());
        Ok(Verifier::new(config, probe).with_stop_signal(stop))
    }
}

impl<P: Probe> Verifier<P> {
    pub fn new(config: VerifyConfig, probe: P) -> Self {
        Verifier {
            config,
            probe: Arc::new(probe),
            cache: ResultCache::new(),
            stop: StopSignal::new(),
        }
    }

    /// Shares an existing cache (e.g. across several runs)
    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = cache;
        self
    }

    /// Lets the caller stop dispatching external probes (Ctrl-C)
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    // Verifies every link in the given documents
    //
    // Returns the final report; per-item failures are part of the report,
    // so this never fails as a whole.
    pub async fn run(&self, documents: &[PathBuf]) -> VerificationReport {
        let tally = Tally::new();

        enter(Phase::Scanning);
        let occurrences = self.scan(documents, &tally).await;

        enter(Phase::Classifying);
        let (internal, external) = self.partition(&occurrences, &tally);

        enter(Phase::ResolvingInternal);
        let mut anchors: HashMap<PathBuf, AnchorIndex> = HashMap::new();
        for link in &internal {
            self.check_internal(link, &mut anchors, &tally);
        }

        enter(Phase::DispatchingExternal);
        self.probe_external(&external).await;

        enter(Phase::Aggregating);
        for link in &external {
            match self.cache.get(&link.url) {
                Some(result) => tally.external_result(&link.url, &link.source, &result),
                None => tally.external_unchecked(),
            }
        }

        let report = tally.snapshot();
        if report.stats.unchecked_links > 0 {
            warn!(
                unchecked = report.stats.unchecked_links,
                "run interrupted; some external links were not checked"
            );
        }

        enter(Phase::Done);
        info!(
            files = report.stats.total_files,
            links = report.stats.total_links,
            working = report.stats.working_links,
            broken = report.stats.broken_links,
            skipped = report.stats.skipped_links,
            "verification finished"
        );
        report
    }

    // Reads each document and extracts its links
    async fn scan(&self, documents: &[PathBuf], tally: &Tally) -> Vec<LinkOccurrence> {
        let mut occurrences = Vec::new();
        for document in documents {
            match scan_document(document).await {
                Ok(links) => {
                    debug!(document = %document.display(), links = links.len(), "scanned");
                    tally.add_file();
                    occurrences.extend(links);
                }
                Err(e) => warn!(document = %document.display(), error = %e, "skipping document"),
            }
        }
        occurrences
    }

    // Classifies every occurrence and counts it exactly once
    fn partition(
        &self,
        occurrences: &[LinkOccurrence],
        tally: &Tally,
    ) -> (Vec<InternalLink>, Vec<ExternalLink>) {
        let mut internal = Vec::new();
        let mut external = Vec::new();

        for link in occurrences {
            match classify(link, &self.config) {
                Classification::Skip(reason) => {
                    debug!(href = %link.href, ?reason, "skipped");
                    tally.count_link(Counted::Skipped);
                }
                Classification::Internal { .. } if self.config.only_external => {
                    tally.count_link(Counted::Skipped);
                }
                Classification::Internal {
                    href,
                    rewritten_from,
                } => {
                    tally.count_link(Counted::Internal);
                    internal.push(InternalLink {
                        href,
                        source: link.source.clone(),
                        rewritten_from,
                    });
                }
                Classification::External { .. } if self.config.skip_external => {
                    tally.count_link(Counted::Skipped);
                }
                Classification::External { url } => {
                    tally.count_link(Counted::External);
                    external.push(ExternalLink {
                        url,
                        source: link.source.clone(),
                    });
                }
            }
        }

        (internal, external)
    }

    // Resolves one internal link on disk and checks its fragment
    //
    // The anchor is only looked at once the target file is known to exist.
    fn check_internal(
        &self,
        link: &InternalLink,
        anchors: &mut HashMap<PathBuf, AnchorIndex>,
        tally: &Tally,
    ) {
        let reported_url = link.rewritten_from.as_deref().unwrap_or(&link.href);
        let (path, fragment) = split_href(&link.href);
        let broken = |error: String| {
            BrokenLinkRecord::internal(reported_url, &link.source, error)
                .with_suggestion(suggest_fix(&link.href, &self.config.site))
        };

        // An empty path means "#fragment in this same document"
        let target = if path.is_empty() {
            link.source.clone()
        } else {
            let candidates = match &link.rewritten_from {
                // The mirror rewrite already removed the base path
                Some(_) => {
                    let site = SiteConfig {
                        base_path: String::new(),
                        ..self.config.site.clone()
                    };
                    resolve_candidates(&link.href, &link.source, &self.config.build_root, &site)
                }
                None => resolve_candidates(
                    &link.href,
                    &link.source,
                    &self.config.build_root,
                    &self.config.site,
                ),
            };
            match first_existing(&candidates) {
                Some(found) => found.clone(),
                None => {
                    let error = describe_missing(&candidates, &self.config.build_root);
                    tally.internal_broken(broken(error));
                    return;
                }
            }
        };

        // Fragments on PDFs, images and the like are not HTML anchors
        let fragment = match fragment {
            Some(fragment) if self.config.verify_anchors && is_page(&target) => fragment,
            _ => {
                tally.internal_ok();
                return;
            }
        };

        match lookup_anchor(anchors, &target, fragment) {
            Ok(check) if check.matched => {
                debug!(href = %link.href, reason = %check.reason, "anchor resolved");
                tally.internal_ok();
            }
            Ok(check) => tally.internal_broken(broken(check.reason)),
            Err(VerifyError::MissingFile(_)) => {
                tally.internal_broken(broken("Target file not found".to_string()))
            }
            Err(e) => tally.internal_broken(broken(e.to_string())),
        }
    }

    // Probes every external URL that is not cached yet
    async fn probe_external(&self, external: &[ExternalLink]) {
        let mut seen = HashSet::new();
        let unique: Vec<String> = external
            .iter()
            .filter(|link| seen.insert(link.url.as_str()))
            .map(|link| link.url.clone())
            .collect();

        // Nothing is probing yet, so this lookup cannot race with writers
        let misses: Vec<String> = unique
            .iter()
            .filter(|url| !self.cache.contains(url))
            .cloned()
            .collect();

        info!(
            unique = unique.len(),
            cached = unique.len() - misses.len(),
            to_probe = misses.len(),
            workers = self.config.workers(),
            "checking external links"
        );
        if misses.is_empty() {
            return;
        }

        let probe = Arc::clone(&self.probe);
        let cache = self.cache.clone();
        let results = run_concurrently(
            misses,
            self.config.workers(),
            move |url| {
                let probe = Arc::clone(&probe);
                let cache = cache.clone();
                async move {
                    let result = probe.check(&url).await;
                    cache.put(&url, result.clone());
                    result
                }
            },
            &self.stop,
        )
        .await;

        // Workers already cached their own results; this also covers probes
        // that died before they could
        for (url, result) in results {
            if !self.cache.contains(&url) {
                self.cache.put(&url, result);
            }
        }
    }
}

async fn scan_document(path: &Path) -> Result<Vec<LinkOccurrence>> {
    let html = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| VerifyError::io(path, e))?;
    extract_html_links(&html, path)
}

// Looks a fragment up in the target, parsing each file at most once per run
fn lookup_anchor(
    anchors: &mut HashMap<PathBuf, AnchorIndex>,
    target: &Path,
    fragment: &str,
) -> Result<AnchorCheckResult> {
    if let Some(index) = anchors.get(target) {
        return Ok(index.find(fragment));
    }
    let index = AnchorIndex::load(target)?;
    let check = index.find(fragment);
    anchors.insert(target.to_path_buf(), index);
    Ok(check)
}

// Pages are HTML files or extensionless files served as HTML
fn is_page(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        None => true,
        Some(ext) => ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::http::ExternalCheckResult;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    // Answers from a fixed table and counts calls per run
    struct TableProbe {
        calls: Arc<AtomicUsize>,
    }

    impl Probe for TableProbe {
        async fn check(&self, url: &str) -> ExternalCheckResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.contains("dead") {
                ExternalCheckResult {
                    reachable: false,
                    status_code: Some(404),
                    message: "HTTP 404 Not Found".to_string(),
                }
            } else {
                ExternalCheckResult {
                    reachable: true,
                    status_code: Some(200),
                    message: "HTTP 200 OK".to_string(),
                }
            }
        }
    }

    fn verifier(root: &Path) -> (Verifier<TableProbe>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let probe = TableProbe {
            calls: Arc::clone(&calls),
        };
        (Verifier::new(VerifyConfig::new(root), probe), calls)
    }

    #[tokio::test]
    async fn test_unreadable_document_is_skipped() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("index.html");
        fs::write(&good, r#"<a href="index.html">self</a>"#).unwrap();

        let (verifier, _) = verifier(dir.path());
        let report = verifier.run(&[good, dir.path().join("missing.html")]).await;

        assert_eq!(report.stats.total_files, 1);
        assert_eq!(report.stats.working_links, 1);
    }

    #[tokio::test]
    async fn test_fragment_on_non_html_target_is_not_an_anchor() {
        let dir = tempdir().unwrap();
        let page = dir.path().join("index.html");
        fs::write(&page, r#"<a href="manual.pdf#page=2">manual</a>"#).unwrap();
        fs::write(dir.path().join("manual.pdf"), [0x25, 0x50, 0x44, 0x46, 0xff, 0xfe]).unwrap();

        let (verifier, _) = verifier(dir.path());
        let report = verifier.run(&[page]).await;

        assert_eq!(report.stats.working_links, 1);
        assert!(!report.has_broken(), "{:?}", report.broken);
    }

    #[tokio::test]
    async fn test_skip_and_only_external_flags() {
        let dir = tempdir().unwrap();
        let page = dir.path().join("index.html");
        fs::write(
            &page,
            r#"<a href="https://ok.example">ext</a><a href="nowhere.html">int</a>"#,
        )
        .unwrap();

        let (mut verifier, calls) = verifier(dir.path());
        verifier.config.skip_external = true;
        let report = verifier.run(&[page.clone()]).await;
        assert_eq!(report.stats.skipped_links, 1);
        assert_eq!(report.stats.internal_links, 1);
        assert_eq!(report.stats.broken_links, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let (mut verifier, calls) = self::verifier(dir.path());
        verifier.config.only_external = true;
        let report = verifier.run(&[page]).await;
        assert_eq!(report.stats.skipped_links, 1);
        assert_eq!(report.stats.external_links, 1);
        assert_eq!(report.stats.working_links, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_suggestion_for_numbered_slug() {
        let dir = tempdir().unwrap();
        let page = dir.path().join("index.html");
        fs::write(&page, r#"<a href="/01-intro">Intro</a>"#).unwrap();

        let (verifier, _) = verifier(dir.path());
        let report = verifier.run(&[page]).await;

        assert_eq!(report.broken.len(), 1);
        assert_eq!(report.broken[0].suggestion.as_deref(), Some("/docs/01-intro"));
        assert!(report.broken[0].error.starts_with("File not found"));
    }

    #[tokio::test]
    async fn test_anchor_in_other_file() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("setup.html"), "<h2>Install Steps</h2>").unwrap();
        let page = root.join("index.html");
        fs::write(
            &page,
            r#"<a href="setup.html#install-steps">ok</a><a href="setup.html#nope">bad</a>"#,
        )
        .unwrap();

        let (verifier, _) = verifier(root);
        let report = verifier.run(&[page]).await;

        assert_eq!(report.stats.working_links, 1);
        assert_eq!(report.stats.broken_links, 1);
        assert_eq!(report.broken[0].error, "Anchor not found in file");
        assert_eq!(report.broken[0].url, "setup.html#nope");
    }
}
