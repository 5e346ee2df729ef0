//! Link rewriter: points resolved links at their target in the rendered
//! content and, optionally, in the Markdown source.

use tracing::{debug, info, instrument};

use smartlinks_markup::{HrefPatch, LinkReference, patch_hrefs, patch_markdown_link};
use smartlinks_shared::{Document, LinkOptions, Result, SourceFile};

use crate::corpus::CorpusEntry;
use crate::source::{read_source, write_atomic};

/// A link matched to a target, waiting to be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRewrite {
    pub link: LinkReference,
    pub target_slug: String,
    pub new_href: String,
    pub score: f64,
}

impl PlannedRewrite {
    pub fn new(link: LinkReference, target: &CorpusEntry, score: f64) -> Self {
        Self {
            link,
            target_slug: target.slug.clone(),
            new_href: target.href(),
            score,
        }
    }
}

/// What applying a document's rewrites changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// Anchors patched in the rendered content.
    pub rendered: usize,
    /// Markdown links patched in the source.
    pub source_links: usize,
    /// Whether the source file was replaced on disk.
    pub source_written: bool,
}

/// Point one link of `doc` at `target`.
pub fn rewrite_link(
    doc: &mut Document,
    link: &LinkReference,
    target: &CorpusEntry,
    options: &LinkOptions,
) -> Result<RewriteOutcome> {
    let planned = PlannedRewrite::new(link.clone(), target, 0.0);
    apply_rewrites(doc, std::slice::from_ref(&planned), options)
}

/// Apply all planned rewrites of one document.
///
/// The links must have been extracted from `doc.content` as it is now. When
/// source rewriting is enabled the source file is replaced first; if that
/// fails the rendered content is left untouched and the error is returned.
#[instrument(skip_all, fields(slug = %doc.slug, rewrites = rewrites.len()))]
pub fn apply_rewrites(
    doc: &mut Document,
    rewrites: &[PlannedRewrite],
    options: &LinkOptions,
) -> Result<RewriteOutcome> {
    let mut outcome = RewriteOutcome::default();
    if rewrites.is_empty() {
        return Ok(outcome);
    }

    if options.rewrite_source {
        match doc.source.as_mut() {
            Some(source) => {
                outcome.source_links = rewrite_source(source, rewrites)?;
                outcome.source_written = outcome.source_links > 0;
            }
            None => debug!("no source file, rewriting rendered content only"),
        }
    }

    let patches: Vec<HrefPatch> = rewrites
        .iter()
        .map(|r| r.link.patch(r.new_href.clone()))
        .collect();
    doc.content = patch_hrefs(&doc.content, &patches)?;
    outcome.rendered = patches.len();

    for rewrite in rewrites {
        info!(
            document = %doc.slug,
            target = %rewrite.target_slug,
            "replaced `{}` with `{}`",
            rewrite.link.markup,
            rewrite.new_href
        );
    }

    Ok(outcome)
}

/// Patch `[text](href)` for each rewrite in the on-disk source and replace it.
///
/// Returns the number of Markdown links changed; the file is only written
/// when that is non-zero.
fn rewrite_source(source: &mut SourceFile, rewrites: &[PlannedRewrite]) -> Result<usize> {
    let mut text = read_source(&source.path)?;
    let mut changed = 0;

    for rewrite in rewrites {
        let link = &rewrite.link;
        match patch_markdown_link(&text, &link.text, &link.href, &rewrite.new_href) {
            Some(patched) => {
                text = patched;
                changed += 1;
            }
            None => debug!(
                path = %source.path.display(),
                text = %link.text,
                href = %link.href,
                "markdown link not found in source"
            ),
        }
    }

    if changed > 0 {
        write_atomic(&source.path, &text)?;
    }
    source.text = text;
    Ok(changed)
}
