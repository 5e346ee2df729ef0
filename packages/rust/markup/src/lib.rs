//! Link extraction and patching for rendered HTML and Markdown source.
//!
//! [`extract_links`] finds the anchors in a document's rendered content whose
//! `href` is neither absolute nor root-relative. Each [`LinkReference`] carries
//! a byte-span handle to its `href` value, which [`patch_hrefs`] uses to
//! rewrite exactly that anchor. [`patch_markdown_link`] applies the same
//! change to the Markdown the document was rendered from.

mod locate;
mod patch;

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use locate::LocatedAnchor;
pub use locate::{HrefSpan, Quote};
pub use patch::{HrefPatch, patch_hrefs, patch_markdown_link};

static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// An anchor in rendered content that is eligible for resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    /// The `href` value as authored (entity-decoded).
    pub href: String,
    /// Visible anchor text.
    pub text: String,
    /// Serialized anchor element, for reporting.
    pub markup: String,
    /// Where the `href` value sits in the content it was extracted from.
    pub location: HrefSpan,
}

impl LinkReference {
    /// Byte range of the `href` value in the originating content.
    pub fn span(&self) -> Range<usize> {
        self.location.span.clone()
    }

    /// A patch pointing this anchor at `new_href`.
    pub fn patch(&self, new_href: impl Into<String>) -> HrefPatch {
        HrefPatch {
            span: self.span(),
            quote: self.location.quote,
            new_href: new_href.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Whether an `href` should be resolved against the corpus.
///
/// Anything mentioning `http://`/`https://` or starting with `/` is left alone.
pub fn is_qualifying(href: &str) -> bool {
    static EXTERNAL_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"https?://").expect("valid regex"));

    !EXTERNAL_RE.is_match(href) && !href.starts_with('/')
}

/// Yield the qualifying links of `content` in document order.
///
/// The handles are only valid for this exact `content`; extract again after
/// any rewrite.
pub fn extract_links(content: &str) -> impl Iterator<Item = LinkReference> + use<> {
    let doc = Html::parse_fragment(content);
    let parsed: Vec<ParsedAnchor> = doc
        .select(&ANCHOR_SEL)
        .filter_map(|el| {
            let href = el.value().attr("href")?.to_string();
            Some(ParsedAnchor {
                href,
                text: el.text().collect(),
                markup: el.html(),
            })
        })
        .collect();

    let located = locate::locate_anchor_hrefs(content);
    let paired = pair_anchors(content, parsed, located);

    paired.into_iter().filter(|link| is_qualifying(&link.href))
}

struct ParsedAnchor {
    href: String,
    text: String,
    markup: String,
}

/// Attach a source location to each parsed anchor.
///
/// Normally both passes see the same anchors and pair up by position. If the
/// parser dropped or invented anchors (malformed markup), fall back to pairing
/// in order by `href` value. An anchor that cannot be placed is skipped on its
/// own; the ones after it are still paired.
fn pair_anchors(
    content: &str,
    parsed: Vec<ParsedAnchor>,
    located: Vec<LocatedAnchor>,
) -> Vec<LinkReference> {
    let into_link = |anchor: ParsedAnchor, location: HrefSpan| LinkReference {
        href: anchor.href,
        text: anchor.text,
        markup: anchor.markup,
        location,
    };

    if parsed.len() == located.len() {
        return parsed
            .into_iter()
            .zip(located)
            .map(|(anchor, found)| into_link(anchor, found.href))
            .collect();
    }

    debug!(
        parsed = parsed.len(),
        located = located.len(),
        "anchor counts differ, pairing by href"
    );

    let values: Vec<Option<String>> = located
        .iter()
        .map(|found| parsed_href(&content[found.tag.clone()]))
        .collect();

    let mut cursor = 0;
    let mut links = Vec::with_capacity(parsed.len());
    for anchor in parsed {
        let hit = values[cursor..]
            .iter()
            .position(|value| value.as_deref() == Some(anchor.href.as_str()));
        match hit {
            Some(offset) => {
                let index = cursor + offset;
                cursor = index + 1;
                links.push(into_link(anchor, located[index].href.clone()));
            }
            None if is_qualifying(&anchor.href) => {
                warn!(
                    markup = %anchor.markup,
                    "could not locate link in content, leaving unchanged"
                );
            }
            None => {}
        }
    }
    links
}

/// The `href` of a lone start tag, decoded the way the full parse decodes it.
fn parsed_href(tag: &str) -> Option<String> {
    let fragment = Html::parse_fragment(tag);
    fragment
        .select(&ANCHOR_SEL)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
