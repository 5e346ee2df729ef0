//! End-to-end run: collections → corpus snapshot → plan → apply.

use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use smartlinks_markup::extract_links;
use smartlinks_shared::{Collection, Document, LinkOptions, Result};

use crate::corpus::Corpus;
use crate::rewrite::{PlannedRewrite, apply_rewrites};
use crate::select::select_best;

/// One link that was pointed at a new target.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteRecord {
    /// Slug of the document containing the link.
    pub document: String,
    /// Original anchor markup.
    pub markup: String,
    pub target_slug: String,
    pub new_href: String,
    pub score: f64,
}

/// Result of a link-resolution run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Documents whose links were inspected.
    pub documents: usize,
    /// Qualifying links found.
    pub links_seen: usize,
    /// Links pointed at a corpus document.
    pub resolved: usize,
    /// Links left unchanged for lack of a match.
    pub unresolved: usize,
    /// Source files replaced on disk.
    pub sources_written: usize,
    pub rewrites: Vec<RewriteRecord>,
    pub elapsed: Duration,
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called before a document's links are matched.
    fn document(&self, slug: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn document(&self, _slug: &str, _current: usize, _total: usize) {}
    fn done(&self, _summary: &RunSummary) {}
}

/// Resolve every qualifying link in every document.
///
/// 1. Snapshot the corpus (articles, translations, drafts, pages, hidden pages)
/// 2. For each document, match its links against every other snapshot entry
/// 3. Apply the matches, source first when enabled
///
/// Unmatched links are left as they are with a warning. Source file I/O
/// errors abort the run.
#[instrument(skip_all, fields(collections = collections.len(), rewrite_source = options.rewrite_source))]
pub fn resolve_links(
    collections: &mut [Collection],
    options: &LinkOptions,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let start = Instant::now();
    let corpus = Corpus::from_collections(collections);
    let total = corpus.len();
    info!(documents = total, "resolving links");

    let mut summary = RunSummary {
        documents: total,
        ..RunSummary::default()
    };

    // --- Plan against the untouched snapshot ---
    let mut plans: Vec<Vec<PlannedRewrite>> = Vec::with_capacity(total);
    for (i, doc) in collections.iter().flat_map(|c| c.documents()).enumerate() {
        progress.document(&doc.slug, i + 1, total);
        plans.push(plan_document(doc, &corpus, &mut summary));
    }

    // --- Apply ---
    let docs = collections.iter_mut().flat_map(|c| c.documents_mut());
    for (doc, planned) in docs.zip(plans) {
        let outcome = apply_rewrites(doc, &planned, options)?;
        if outcome.source_written {
            summary.sources_written += 1;
        }
        summary.resolved += outcome.rendered;
        summary
            .rewrites
            .extend(planned.into_iter().map(|p| RewriteRecord {
                document: doc.slug.clone(),
                markup: p.link.markup,
                target_slug: p.target_slug,
                new_href: p.new_href,
                score: p.score,
            }));
    }

    summary.elapsed = start.elapsed();
    info!(
        links = summary.links_seen,
        resolved = summary.resolved,
        unresolved = summary.unresolved,
        sources_written = summary.sources_written,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "link resolution complete"
    );
    progress.done(&summary);

    Ok(summary)
}

/// Match each qualifying link of `doc`, excluding `doc` itself.
fn plan_document(doc: &Document, corpus: &Corpus, summary: &mut RunSummary) -> Vec<PlannedRewrite> {
    let mut planned = Vec::new();

    for link in extract_links(&doc.content) {
        summary.links_seen += 1;
        match select_best(&link.href, corpus, &doc.slug) {
            Some(best) => planned.push(PlannedRewrite::new(link, best.entry, best.score)),
            None => {
                summary.unresolved += 1;
                warn!(
                    document = %doc.slug,
                    kind = %doc.kind,
                    "no match found for link `{}`, leaving unchanged",
                    link.markup
                );
            }
        }
    }

    planned
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartlinks_shared::SourceFile;
    use std::sync::Mutex;

    fn doc_a() -> Document {
        Document::new("a", "A", r#"<a href="other">other</a>"#)
    }

    fn doc_b() -> Document {
        Document::new("b", "Other Post", "Read the other post here.")
    }

    fn content_of<'a>(collections: &'a [Collection], slug: &str) -> &'a str {
        collections
            .iter()
            .flat_map(|c| c.documents())
            .find(|d| d.slug == slug)
            .map(|d| d.content.as_str())
            .expect("document present")
    }

    #[test]
    fn resolves_link_to_other_document() {
        let mut collections = vec![Collection::articles(vec![doc_a(), doc_b()], vec![], vec![])];

        let summary =
            resolve_links(&mut collections, &LinkOptions::default(), &SilentProgress).unwrap();

        assert_eq!(content_of(&collections, "a"), r#"<a href="/b">other</a>"#);
        assert_eq!(content_of(&collections, "b"), "Read the other post here.");
        assert_eq!(summary.documents, 2);
        assert_eq!(summary.links_seen, 1);
        assert_eq!(summary.resolved, 1);
        assert_eq!(summary.unresolved, 0);
        assert_eq!(summary.rewrites[0].document, "a");
        assert_eq!(summary.rewrites[0].new_href, "/b");
    }

    #[test]
    fn rewrites_source_when_enabled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.md");
        std::fs::write(&path, "[other](other)\n").expect("write");

        let a = doc_a().with_source(SourceFile::new(&path, "[other](other)\n"));
        let mut collections = vec![Collection::articles(vec![a, doc_b()], vec![], vec![])];

        let summary = resolve_links(
            &mut collections,
            &LinkOptions {
                rewrite_source: true,
            },
            &SilentProgress,
        )
        .unwrap();

        assert_eq!(std::fs::read_to_string(&path).expect("read"), "[other](/b)\n");
        assert_eq!(content_of(&collections, "a"), r#"<a href="/b">other</a>"#);
        assert_eq!(summary.sources_written, 1);
    }

    #[test]
    fn repeated_link_is_rewritten_in_content_and_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.md");
        let source = "[other](other) and [other](other)\n";
        std::fs::write(&path, source).expect("write");

        let a = Document::new(
            "a",
            "A",
            r#"<p><a href="other">other</a> and <a href="other">other</a></p>"#,
        )
        .with_source(SourceFile::new(&path, source));
        let mut collections = vec![Collection::articles(vec![a, doc_b()], vec![], vec![])];

        let summary = resolve_links(
            &mut collections,
            &LinkOptions {
                rewrite_source: true,
            },
            &SilentProgress,
        )
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            "[other](/b) and [other](/b)\n"
        );
        assert_eq!(
            content_of(&collections, "a"),
            r#"<p><a href="/b">other</a> and <a href="/b">other</a></p>"#
        );
        assert_eq!(summary.resolved, 2);
        assert_eq!(summary.sources_written, 1);
    }

    #[test]
    fn stray_less_than_in_text_keeps_links_resolvable() {
        let a = Document::new("a", "A", r#"<p>I <3 this, <a href="other">other</a></p>"#);
        let mut collections = vec![Collection::articles(vec![a, doc_b()], vec![], vec![])];

        let summary =
            resolve_links(&mut collections, &LinkOptions::default(), &SilentProgress).unwrap();

        assert_eq!(summary.links_seen, 1);
        assert_eq!(
            content_of(&collections, "a"),
            r#"<p>I <3 this, <a href="/b">other</a></p>"#
        );
    }

    #[test]
    fn links_across_articles_and_pages() {
        let page = Document::new("about", "About", r#"<a href="pelican plugins">see</a>"#);
        let hidden = Document::new("thanks", "Thanks", r#"<a href="about">back</a>"#);
        let draft = Document::new(
            "plugins",
            "Writing Pelican plugins",
            "Notes on pelican plugins.",
        );
        let mut collections = vec![
            Collection::articles(vec![], vec![], vec![draft]),
            Collection::pages(vec![page], vec![hidden]),
        ];

        resolve_links(&mut collections, &LinkOptions::default(), &SilentProgress).unwrap();

        assert_eq!(
            content_of(&collections, "about"),
            r#"<a href="/plugins">see</a>"#
        );
        // Hidden pages resolve too, and can point at visible pages.
        assert_eq!(content_of(&collections, "thanks"), r#"<a href="/about">back</a>"#);
    }

    #[test]
    fn unmatched_links_are_left_alone() {
        let lonely = Document::new("a", "A", r#"<a href="nowhere">x</a><a href="https://e.com">e</a>"#);
        let mut collections = vec![Collection::articles(vec![lonely, doc_b()], vec![], vec![])];

        let summary =
            resolve_links(&mut collections, &LinkOptions::default(), &SilentProgress).unwrap();

        assert_eq!(
            content_of(&collections, "a"),
            r#"<a href="nowhere">x</a><a href="https://e.com">e</a>"#
        );
        assert_eq!(summary.links_seen, 1);
        assert_eq!(summary.unresolved, 1);
        assert!(summary.rewrites.is_empty());
    }

    #[test]
    fn a_document_never_links_to_itself() {
        let selfish = Document::new("guide", "Guide", r#"guide guide <a href="guide">g</a>"#);
        let mut collections = vec![Collection::articles(vec![selfish], vec![], vec![])];

        let summary =
            resolve_links(&mut collections, &LinkOptions::default(), &SilentProgress).unwrap();

        assert_eq!(summary.unresolved, 1);
        assert_eq!(
            content_of(&collections, "guide"),
            r#"guide guide <a href="guide">g</a>"#
        );
    }

    #[test]
    fn results_do_not_depend_on_earlier_rewrites() {
        // "a" and "c" score against each other's content. Whichever is
        // rewritten first must not change how the other one resolves.
        let a = Document::new("a", "A", r#"<a href="b">link b</a>"#);
        let b = Document::new("b", "B", "plain");
        let c = Document::new("c", "C", r#"<a href="b">to b</a>"#);

        let mut forward = vec![Collection::articles(
            vec![a.clone(), b.clone(), c.clone()],
            vec![],
            vec![],
        )];
        let mut backward = vec![Collection::articles(vec![c, b, a], vec![], vec![])];

        resolve_links(&mut forward, &LinkOptions::default(), &SilentProgress).unwrap();
        resolve_links(&mut backward, &LinkOptions::default(), &SilentProgress).unwrap();

        for slug in ["a", "c"] {
            assert_eq!(content_of(&forward, slug), content_of(&backward, slug));
        }
    }

    #[test]
    fn source_failure_aborts_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = doc_a().with_source(SourceFile::new(dir.path().join("gone.md"), ""));
        let mut collections = vec![Collection::articles(vec![a, doc_b()], vec![], vec![])];

        let result = resolve_links(
            &mut collections,
            &LinkOptions {
                rewrite_source: true,
            },
            &SilentProgress,
        );

        assert!(result.is_err());
        assert_eq!(content_of(&collections, "a"), r#"<a href="other">other</a>"#);
    }

    struct Recording(Mutex<Vec<String>>);

    impl ProgressReporter for Recording {
        fn document(&self, slug: &str, current: usize, total: usize) {
            self.0
                .lock()
                .unwrap()
                .push(format!("{current}/{total} {slug}"));
        }
        fn done(&self, summary: &RunSummary) {
            self.0
                .lock()
                .unwrap()
                .push(format!("done {}", summary.resolved));
        }
    }

    #[test]
    fn reports_progress_per_document() {
        let mut collections = vec![Collection::articles(vec![doc_a(), doc_b()], vec![], vec![])];
        let progress = Recording(Mutex::new(Vec::new()));

        resolve_links(&mut collections, &LinkOptions::default(), &progress).unwrap();

        assert_eq!(
            progress.0.into_inner().unwrap(),
            vec!["1/2 a", "2/2 b", "done 1"]
        );
    }
}
