//! Corpus index: every document that may be a link target in a run.

use tracing::{debug, instrument};

use smartlinks_shared::{Collection, Document};

/// Flatten all collections into one ordered list.
///
/// Articles contribute articles, translations and drafts; pages contribute
/// pages and hidden pages. Collaborator order is kept and only ever used to
/// break score ties.
pub fn build_corpus(collections: &[Collection]) -> Vec<&Document> {
    collections.iter().flat_map(|c| c.documents()).collect()
}

/// A candidate document as it looked before any link was rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusEntry {
    pub slug: String,
    /// Internal path links to this document should use (no leading `/`).
    pub target: String,
    /// Text scored against link patterns: content followed by title.
    pub haystack: String,
}

impl CorpusEntry {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            slug: doc.slug.clone(),
            target: doc.target_path().to_string(),
            haystack: format!("{}{}", doc.content, doc.title),
        }
    }

    /// The `href` a resolved link should carry.
    pub fn href(&self) -> String {
        format!("/{}", self.target)
    }
}

/// Immutable snapshot of the corpus, taken before any rewrite.
///
/// Scoring only ever reads the snapshot, so the outcome does not depend on
/// the order documents are processed in.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

impl Corpus {
    #[instrument(skip_all)]
    pub fn snapshot<'a>(docs: impl IntoIterator<Item = &'a Document>) -> Self {
        let entries: Vec<CorpusEntry> = docs.into_iter().map(CorpusEntry::from_document).collect();
        debug!(entries = entries.len(), "corpus snapshot taken");
        Self { entries }
    }

    pub fn from_collections(collections: &[Collection]) -> Self {
        Self::snapshot(build_corpus(collections))
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(slug: &str) -> Document {
        Document::new(slug, slug.to_uppercase(), format!("body of {slug}"))
    }

    #[test]
    fn flattens_in_collaborator_order() {
        let collections = vec![
            Collection::articles(vec![doc("a1"), doc("a2")], vec![doc("t1")], vec![doc("d1")]),
            Collection::pages(vec![doc("p1")], vec![doc("h1")]),
        ];
        let slugs: Vec<&str> = build_corpus(&collections)
            .iter()
            .map(|d| d.slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["a1", "a2", "t1", "d1", "p1", "h1"]);
    }

    #[test]
    fn empty_collections_give_empty_corpus() {
        assert!(build_corpus(&[]).is_empty());
        assert!(Corpus::from_collections(&[Collection::pages(vec![], vec![])]).is_empty());
    }

    #[test]
    fn entry_haystack_is_content_then_title() {
        let entry = CorpusEntry::from_document(&Document::new("b", "Other Post", "Read it. "));
        assert_eq!(entry.haystack, "Read it. Other Post");
        assert_eq!(entry.href(), "/b");
    }

    #[test]
    fn entry_target_prefers_url() {
        let entry =
            CorpusEntry::from_document(&Document::new("b", "B", "").with_url("/blog/b.html"));
        assert_eq!(entry.href(), "/blog/b.html");
    }

    #[test]
    fn snapshot_is_detached_from_documents() {
        let mut collections = vec![Collection::articles(vec![doc("a")], vec![], vec![])];
        let corpus = Corpus::from_collections(&collections);

        for d in collections[0].documents_mut() {
            d.content = "rewritten".into();
        }
        assert_eq!(corpus.entries()[0].haystack, "body of aA");
    }
}
