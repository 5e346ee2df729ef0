//! In-place rewrites of link targets in rendered HTML and Markdown source.

use std::ops::Range;

use regex::{Captures, Regex};

use smartlinks_shared::{Result, SmartLinksError};

use crate::locate::Quote;

/// A new value for one located `href` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HrefPatch {
    /// Byte range of the current value, as located in the content.
    pub span: Range<usize>,
    pub quote: Quote,
    pub new_href: String,
}

/// Replace the addressed `href` values, leaving every other byte untouched.
///
/// Spans must come from extracting links out of this exact `content`.
/// Patches are applied back-to-front so earlier spans stay valid.
pub fn patch_hrefs(content: &str, patches: &[HrefPatch]) -> Result<String> {
    let mut ordered: Vec<&HrefPatch> = patches.iter().collect();
    ordered.sort_by(|a, b| b.span.start.cmp(&a.span.start));

    let mut result = content.to_string();
    let mut limit = content.len();
    for patch in ordered {
        let span = patch.span.clone();
        if span.start > span.end
            || span.end > limit
            || !content.is_char_boundary(span.start)
            || !content.is_char_boundary(span.end)
        {
            return Err(SmartLinksError::parse(format!(
                "link handle {span:?} does not address this content"
            )));
        }

        let replacement = match patch.quote {
            Quote::Double => escape_attr(&patch.new_href, '"'),
            Quote::Single => escape_attr(&patch.new_href, '\''),
            Quote::Unquoted => format!("\"{}\"", escape_attr(&patch.new_href, '"')),
        };
        result.replace_range(span.clone(), &replacement);
        limit = span.start;
    }

    Ok(result)
}

/// Rewrite the first `[text](old_href)` in Markdown `source` to point at `new_href`.
///
/// An optional link title (`[text](href "title")`) is kept. Returns `None`
/// when the source contains no such link.
pub fn patch_markdown_link(
    source: &str,
    text: &str,
    old_href: &str,
    new_href: &str,
) -> Option<String> {
    let pattern = format!(
        r#"\[({})\]\({}(\s+"[^"]*")?\)"#,
        regex::escape(text),
        regex::escape(old_href)
    );
    let re = Regex::new(&pattern).ok()?;
    if !re.is_match(source) {
        return None;
    }

    let patched = re.replacen(source, 1, |caps: &Captures| {
        let title = caps.get(2).map_or("", |m| m.as_str());
        format!("[{}]({new_href}{title})", &caps[1])
    });
    Some(patched.into_owned())
}

fn escape_attr(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
