//! End-to-end engine scenarios on small fake documentation builds

use doc_link_guardian::{
    ExternalCheckResult, LinkKind, Probe, ResultCache, StopSignal, VerifyConfig, Verifier,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

/// Fake prober: URLs containing "dead" answer 404, everything else 200
#[derive(Clone, Default)]
struct FakeProbe {
    calls: Arc<AtomicUsize>,
}

impl FakeProbe {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Probe for FakeProbe {
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

/// Creates `docs/build` inside a temp dir and writes the given pages into it
fn build_site(pages: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let root = dir.path().join("docs/build");
    for (path, html) in pages {
        let file = root.join(path);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, html).unwrap();
    }
    (dir, root)
}

fn page(root: &Path, path: &str) -> PathBuf {
    root.join(path)
}

#[tokio::test]
async fn test_html_suffix_candidate_resolves() {
    let (_dir, root) = build_site(&[
        ("index.html", r#"<a href="/docs/guide">Guide</a>"#),
        ("docs/guide.html", "<h1>Guide</h1>"),
    ]);

    let probe = FakeProbe::default();
    let verifier = Verifier::new(VerifyConfig::new(&root), probe.clone());
    let report = verifier.run(&[page(&root, "index.html")]).await;

    assert_eq!(report.stats.internal_links, 1);
    assert_eq!(report.stats.working_links, 1);
    assert!(!report.has_broken(), "{:?}", report.broken);
    assert_eq!(probe.calls(), 0);
}

#[tokio::test]
async fn test_missing_anchor_is_reported() {
    let (_dir, root) = build_site(&[(
        "index.html",
        r##"<h2>Intro</h2><h2>Setup</h2><a href="#missing-anchor">Broken</a><a href="#setup">Ok</a>"##,
    )]);

    let verifier = Verifier::new(VerifyConfig::new(&root), FakeProbe::default());
    let report = verifier.run(&[page(&root, "index.html")]).await;

    assert_eq!(report.stats.working_links, 1);
    assert_eq!(report.stats.broken_links, 1);
    let record = &report.broken[0];
    assert_eq!(record.kind, LinkKind::Internal);
    assert_eq!(record.url, "#missing-anchor");
    assert_eq!(record.error, "Anchor not found in file");
}

#[tokio::test]
async fn test_own_mirror_is_checked_on_disk() {
    let (_dir, root) = build_site(&[
        (
            "index.html",
            r#"
            <a href="https://octo.github.io/handbook/docs/x">Self link</a>
            <a href="https://octo.github.io/handbook/docs/gone">Broken self link</a>
            "#,
        ),
        ("docs/x.html", "<h1>X</h1>"),
    ]);

    let mut config = VerifyConfig::new(&root);
    config.site.mirror_hosts = vec!["octo.github.io".to_string()];
    config.site.base_path = "/handbook".to_string();

    let probe = FakeProbe::default();
    let verifier = Verifier::new(config, probe.clone());
    let report = verifier.run(&[page(&root, "index.html")]).await;

    assert_eq!(probe.calls(), 0, "self links must never reach the network");
    assert_eq!(report.stats.internal_links, 2);
    assert_eq!(report.stats.external_links, 0);
    assert_eq!(report.stats.working_links, 1);
    assert_eq!(report.broken.len(), 1);
    assert_eq!(report.broken[0].url, "https://octo.github.io/handbook/docs/gone");
    assert!(report.broken[0].error.starts_with("File not found"));
}

#[tokio::test]
async fn test_mirror_path_repeating_base_path_is_resolved_once() {
    // The site itself has a section named like the base path
    let (_dir, root) = build_site(&[
        (
            "index.html",
            r#"<a href="https://octo.github.io/handbook/handbook/x">Nested</a>"#,
        ),
        ("handbook/x.html", "<h1>X</h1>"),
    ]);

    let mut config = VerifyConfig::new(&root);
    config.site.mirror_hosts = vec!["octo.github.io".to_string()];
    config.site.base_path = "/handbook".to_string();

    let probe = FakeProbe::default();
    let verifier = Verifier::new(config, probe.clone());
    let report = verifier.run(&[page(&root, "index.html")]).await;

    assert_eq!(probe.calls(), 0);
    assert_eq!(report.stats.working_links, 1);
    assert!(!report.has_broken(), "{:?}", report.broken);
}

#[tokio::test]
async fn test_same_url_across_pages_is_probed_once() {
    let (_dir, root) = build_site(&[
        ("a.html", r#"<a href="https://dead.example/x">x</a><a href="https://ok.example">ok</a>"#),
        ("b.html", r#"<a href="https://dead.example/x">x</a>"#),
        ("c.html", r#"<a href="https://dead.example/x">x</a><a href="https://ok.example">ok</a>"#),
    ]);

    let probe = FakeProbe::default();
    let verifier = Verifier::new(VerifyConfig::new(&root), probe.clone());
    let docs = vec![page(&root, "a.html"), page(&root, "b.html"), page(&root, "c.html")];
    let report = verifier.run(&docs).await;

    assert_eq!(probe.calls(), 2);
    assert_eq!(report.stats.external_links, 5);
    assert_eq!(report.stats.working_links, 2);
    assert_eq!(report.stats.broken_links, 3);

    assert_eq!(report.broken.len(), 1);
    let record = &report.broken[0];
    assert_eq!(record.kind, LinkKind::External);
    assert_eq!(record.occurrences, 3);
    assert_eq!(record.sources, docs);
    assert_eq!(record.status_code, Some(404));
    assert_eq!(report.working_external, vec!["https://ok.example".to_string()]);
}

#[tokio::test]
async fn test_shared_cache_skips_network_on_second_run() {
    let (_dir, root) = build_site(&[("index.html", r#"<a href="https://ok.example">ok</a>"#)]);
    let cache = ResultCache::new();

    let first = FakeProbe::default();
    Verifier::new(VerifyConfig::new(&root), first.clone())
        .with_cache(cache.clone())
        .run(&[page(&root, "index.html")])
        .await;
    assert_eq!(first.calls(), 1);

    let second = FakeProbe::default();
    let report = Verifier::new(VerifyConfig::new(&root), second.clone())
        .with_cache(cache.clone())
        .run(&[page(&root, "index.html")])
        .await;
    assert_eq!(second.calls(), 0);
    assert_eq!(report.stats.working_links, 1);
}

#[tokio::test]
async fn test_skipped_links_only_count_as_skipped() {
    let (_dir, root) = build_site(&[(
        "index.html",
        r##"
        <a href="mailto:team@example.com">Mail</a>
        <a href="javascript:void(0)">JS</a>
        <a href="#" aria-haspopup="true">Menu</a>
        <a href="#" role="button">Toggle</a>
        <a href="">Empty</a>
        "##,
    )]);

    let verifier = Verifier::new(VerifyConfig::new(&root), FakeProbe::default());
    let report = verifier.run(&[page(&root, "index.html")]).await;

    assert_eq!(report.stats.total_links, 5);
    assert_eq!(report.stats.skipped_links, 5);
    assert_eq!(report.stats.internal_links, 0);
    assert_eq!(report.stats.external_links, 0);
    assert_eq!(report.stats.working_links + report.stats.broken_links, 0);
}

#[tokio::test]
async fn test_bare_fragment_with_anchors_disabled_is_skipped() {
    let (_dir, root) = build_site(&[("index.html", r##"<a href="#">Top</a>"##)]);

    let mut config = VerifyConfig::new(&root);
    config.verify_anchors = false;
    let report = Verifier::new(config, FakeProbe::default())
        .run(&[page(&root, "index.html")])
        .await;
    assert_eq!(report.stats.skipped_links, 1);
    assert!(!report.has_broken());

    let report = Verifier::new(VerifyConfig::new(&root), FakeProbe::default())
        .run(&[page(&root, "index.html")])
        .await;
    assert_eq!(report.stats.internal_links, 1);
    assert_eq!(report.stats.working_links, 1);
}

#[tokio::test]
async fn test_interrupted_run_leaves_links_unchecked() {
    let (_dir, root) = build_site(&[(
        "index.html",
        r#"<a href="https://one.example">1</a><a href="https://two.example">2</a>"#,
    )]);

    let stop = StopSignal::new();
    stop.stop();
    let probe = FakeProbe::default();
    let report = Verifier::new(VerifyConfig::new(&root), probe.clone())
        .with_stop_signal(stop)
        .run(&[page(&root, "index.html")])
        .await;

    assert_eq!(probe.calls(), 0);
    assert_eq!(report.stats.external_links, 2);
    assert_eq!(report.stats.unchecked_links, 2);
    assert!(!report.has_broken());
}
