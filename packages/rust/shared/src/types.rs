//! Core domain types: documents and the pipeline collections that hold them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DocumentKind
// ---------------------------------------------------------------------------

/// Which collection a document was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    Article,
    Translation,
    Draft,
    Page,
    HiddenPage,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Article => "article",
            Self::Translation => "translation",
            Self::Draft => "draft",
            Self::Page => "page",
            Self::HiddenPage => "hidden page",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// SourceFile
// ---------------------------------------------------------------------------

/// The Markdown file a document was rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Location on disk.
    pub path: PathBuf,
    /// Raw Markdown text as last read or written.
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A generated document whose rendered links may be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Unique identity within a run.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Rendered HTML body. Mutated in place when links are resolved.
    pub content: String,
    /// Explicit output URL, if the pipeline assigned one.
    pub url: Option<String>,
    /// Output path without extension (e.g. `posts/2024/hello`).
    pub path_no_ext: String,
    /// Producing collection.
    pub kind: DocumentKind,
    /// Backing Markdown source, when known.
    pub source: Option<SourceFile>,
}

impl Document {
    /// Create an article with `path_no_ext` defaulting to the slug.
    pub fn new(
        slug: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let slug = slug.into();
        Self {
            path_no_ext: slug.clone(),
            slug,
            title: title.into(),
            content: content.into(),
            url: None,
            kind: DocumentKind::default(),
            source: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_path_no_ext(mut self, path: impl Into<String>) -> Self {
        self.path_no_ext = path.into();
        self
    }

    pub fn with_source(mut self, source: SourceFile) -> Self {
        self.source = Some(source);
        self
    }

    /// Stable internal path other documents should link to.
    ///
    /// First non-empty of `url`, `slug`, `path_no_ext`, without a leading `/`.
    pub fn target_path(&self) -> &str {
        [self.url.as_deref(), Some(self.slug.as_str()), Some(self.path_no_ext.as_str())]
            .into_iter()
            .flatten()
            .map(|s| s.trim_start_matches('/'))
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// Documents handed over by one pipeline collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collection {
    /// Article-like generator output.
    Articles {
        articles: Vec<Document>,
        translations: Vec<Document>,
        drafts: Vec<Document>,
    },
    /// Page-like generator output.
    Pages {
        pages: Vec<Document>,
        hidden_pages: Vec<Document>,
    },
}

impl Collection {
    /// Build an article collection, stamping each document's kind.
    pub fn articles(
        articles: Vec<Document>,
        translations: Vec<Document>,
        drafts: Vec<Document>,
    ) -> Self {
        Self::Articles {
            articles: with_kind(articles, DocumentKind::Article),
            translations: with_kind(translations, DocumentKind::Translation),
            drafts: with_kind(drafts, DocumentKind::Draft),
        }
    }

    /// Build a page collection, stamping each document's kind.
    pub fn pages(pages: Vec<Document>, hidden_pages: Vec<Document>) -> Self {
        Self::Pages {
            pages: with_kind(pages, DocumentKind::Page),
            hidden_pages: with_kind(hidden_pages, DocumentKind::HiddenPage),
        }
    }

    /// All documents in collaborator order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        let groups: Vec<&Vec<Document>> = match self {
            Self::Articles {
                articles,
                translations,
                drafts,
            } => vec![articles, translations, drafts],
            Self::Pages {
                pages,
                hidden_pages,
            } => vec![pages, hidden_pages],
        };
        groups.into_iter().flatten()
    }

    /// Mutable access to all documents, same order as [`Collection::documents`].
    pub fn documents_mut(&mut self) -> impl Iterator<Item = &mut Document> {
        let groups: Vec<&mut Vec<Document>> = match self {
            Self::Articles {
                articles,
                translations,
                drafts,
            } => vec![articles, translations, drafts],
            Self::Pages {
                pages,
                hidden_pages,
            } => vec![pages, hidden_pages],
        };
        groups.into_iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.documents().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn with_kind(mut docs: Vec<Document>, kind: DocumentKind) -> Vec<Document> {
    for doc in &mut docs {
        doc.kind = kind;
    }
    docs
}
