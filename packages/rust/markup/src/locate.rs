//! Byte-level scan for anchor start tags and their `href` value spans.
//!
//! The HTML parser gives us a tree but no source positions. This scanner walks
//! the raw text in document order and records where each `<a>` tag's `href`
//! value lives, so a rewrite can address exactly one anchor.

use std::ops::Range;

/// Elements whose content is text, not markup.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "textarea", "title", "noscript", "iframe", "noembed", "noframes", "xmp",
];

/// How an attribute value is delimited in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
    Unquoted,
}

/// An `href` attribute value located in the raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HrefSpan {
    /// Byte range of the value, excluding quotes.
    pub span: Range<usize>,
    pub quote: Quote,
}

impl HrefSpan {
    /// The raw (undecoded) value in `content`.
    pub fn raw<'a>(&self, content: &'a str) -> &'a str {
        &content[self.span.clone()]
    }
}

/// An `<a>` start tag with an `href`, as found by [`locate_anchor_hrefs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocatedAnchor {
    /// Byte range of the whole start tag, `<a` through `>`.
    pub tag: Range<usize>,
    pub href: HrefSpan,
}

/// Locate the `href` of every `<a>` start tag that carries one, in order.
pub(crate) fn locate_anchor_hrefs(content: &str) -> Vec<LocatedAnchor> {
    let bytes = content.as_bytes();
    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(offset) = bytes[pos..].iter().position(|&b| b == b'<') {
        let start = pos + offset;
        let rest = &bytes[start..];

        if rest.starts_with(b"<!--") {
            pos = find(bytes, start + 4, b"-->").map_or(bytes.len(), |end| end + 3);
            continue;
        }
        if rest.starts_with(b"</") || rest.starts_with(b"<!") || rest.starts_with(b"<?") {
            pos = find(bytes, start + 1, b">").map_or(bytes.len(), |end| end + 1);
            continue;
        }

        // `<3`, `< b` and friends are text.
        if !rest.get(1).is_some_and(u8::is_ascii_alphabetic) {
            pos = start + 1;
            continue;
        }
        let name_end = scan_while(bytes, start + 1, |b| b.is_ascii_alphanumeric() || b == b'-');
        let name = content[start + 1..name_end].to_ascii_lowercase();

        let tag = parse_attributes(bytes, name_end);
        pos = tag.end;

        if name == "a" {
            if let Some(href) = tag.href {
                found.push(LocatedAnchor {
                    tag: start..tag.end,
                    href,
                });
            }
        } else if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            pos = skip_raw_text(content, pos, &name);
        }
    }

    found
}

struct StartTag {
    /// Byte just past the closing `>`.
    end: usize,
    /// First `href` attribute, as an HTML parser would keep it.
    href: Option<HrefSpan>,
}

fn parse_attributes(bytes: &[u8], mut pos: usize) -> StartTag {
    let mut href = None;

    loop {
        pos = scan_while(bytes, pos, |b| b.is_ascii_whitespace() || b == b'/');
        match bytes.get(pos) {
            None => return StartTag { end: pos, href },
            Some(b'>') => return StartTag { end: pos + 1, href },
            Some(_) => {}
        }

        let name_start = pos;
        pos = scan_while(bytes, pos + 1, |b| {
            !(b.is_ascii_whitespace() || matches!(b, b'=' | b'>' | b'/'))
        });
        let is_href = bytes[name_start..pos].eq_ignore_ascii_case(b"href");

        let after_name = scan_while(bytes, pos, |b| b.is_ascii_whitespace());
        if bytes.get(after_name) != Some(&b'=') {
            continue;
        }
        pos = scan_while(bytes, after_name + 1, |b| b.is_ascii_whitespace());

        let value = match bytes.get(pos) {
            Some(&q @ (b'"' | b'\'')) => {
                let close = find(bytes, pos + 1, &[q]).unwrap_or(bytes.len());
                let quote = if q == b'"' { Quote::Double } else { Quote::Single };
                let value = HrefSpan {
                    span: pos + 1..close,
                    quote,
                };
                pos = (close + 1).min(bytes.len());
                value
            }
            _ => {
                let end = scan_while(bytes, pos, |b| !(b.is_ascii_whitespace() || b == b'>'));
                let value = HrefSpan {
                    span: pos..end,
                    quote: Quote::Unquoted,
                };
                pos = end;
                value
            }
        };

        if is_href && href.is_none() {
            href = Some(value);
        }
    }
}

/// Skip to the matching `</name` of a raw-text element.
fn skip_raw_text(content: &str, from: usize, name: &str) -> usize {
    let closing = format!("</{name}");
    content[from..]
        .to_ascii_lowercase()
        .find(&closing)
        .map_or(content.len(), |offset| from + offset)
}

fn scan_while(bytes: &[u8], mut pos: usize, pred: impl Fn(u8) -> bool) -> usize {
    while pos < bytes.len() && pred(bytes[pos]) {
        pos += 1;
    }
    pos
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raws(content: &str) -> Vec<&str> {
        locate_anchor_hrefs(content)
            .iter()
            .map(|a| a.href.raw(content))
            .collect()
    }

    #[test]
    fn finds_hrefs_in_document_order() {
        let html = r#"<p><a href="one">1</a> and <A HREF='two'>2</A> and <a href=three>3</a></p>"#;
        assert_eq!(raws(html), vec!["one", "two", "three"]);

        let quotes: Vec<Quote> = locate_anchor_hrefs(html)
            .iter()
            .map(|a| a.href.quote)
            .collect();
        assert_eq!(quotes, vec![Quote::Double, Quote::Single, Quote::Unquoted]);
    }

    #[test]
    fn skips_anchors_without_href() {
        assert_eq!(raws(r#"<a name="top">x</a><a class="c" href="y">y</a>"#), vec!["y"]);
    }

    #[test]
    fn ignores_other_tags_and_attributes() {
        let html = r#"<abbr href="no">x</abbr><link href="style.css"><a data-href="no" href="yes">y</a>"#;
        assert_eq!(raws(html), vec!["yes"]);
    }

    #[test]
    fn skips_comments_and_raw_text() {
        let html = r#"<!-- <a href="c"> --><script>var s = '<a href="s">';</script><a href="real">r</a>"#;
        assert_eq!(raws(html), vec!["real"]);
    }

    #[test]
    fn keeps_first_duplicate_href() {
        assert_eq!(raws(r#"<a href="first" href="second">x</a>"#), vec!["first"]);
    }

    #[test]
    fn value_may_contain_gt_when_quoted() {
        assert_eq!(raws(r#"<a title="a > b" href="x>y">t</a>"#), vec!["x>y"]);
    }

    #[test]
    fn spans_are_byte_offsets() {
        let html = "<p>héllo <a href=\"naïve\">n</a></p>";
        let spans = locate_anchor_hrefs(html);
        assert_eq!(&html[spans[0].href.span.clone()], "naïve");
    }

    #[test]
    fn less_than_before_digit_is_text() {
        let html = r#"<p>I <3 this, <a href="other">other</a> and 1 <2x <a href="next">n</a></p>"#;
        assert_eq!(raws(html), vec!["other", "next"]);
    }

    #[test]
    fn records_whole_start_tag() {
        let html = r#"<p><a class="x" href="y">y</a></p>"#;
        let anchors = locate_anchor_hrefs(html);
        assert_eq!(&html[anchors[0].tag.clone()], r#"<a class="x" href="y">"#);
    }

    #[test]
    fn tolerates_truncated_markup() {
        assert_eq!(raws(r#"<a href="open"#), vec!["open"]);
        assert!(raws("<").is_empty());
        assert!(raws("<!-- never closed <a href=\"x\">").is_empty());
    }
}
