//! JSON corpus manifest: the pipeline's collections as a file on disk.
//!
//! ```json
//! { "collections": [
//!   { "kind": "articles", "articles": [ { "slug": "a", "title": "A", "content": "<p>…</p>" } ] },
//!   { "kind": "pages", "pages": [], "hidden_pages": [] }
//! ] }
//! ```
//!
//! Relative `source_path`s are resolved against the manifest's directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use smartlinks_shared::{Collection, Document, Result, SmartLinksError, SourceFile};

use crate::source::{read_source, write_atomic};

/// Root of a manifest file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub collections: Vec<CollectionRecord>,
}

/// One collaborator's documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectionRecord {
    Articles {
        #[serde(default)]
        articles: Vec<DocumentRecord>,
        #[serde(default)]
        translations: Vec<DocumentRecord>,
        #[serde(default)]
        drafts: Vec<DocumentRecord>,
    },
    Pages {
        #[serde(default)]
        pages: Vec<DocumentRecord>,
        #[serde(default)]
        hidden_pages: Vec<DocumentRecord>,
    },
}

/// A document as stored in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub slug: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Defaults to the slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_no_ext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
}

/// Load collections from a manifest, reading each referenced source file.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_manifest(path: &Path) -> Result<Vec<Collection>> {
    let raw = std::fs::read_to_string(path).map_err(|e| SmartLinksError::io(path, e))?;
    let manifest: Manifest = serde_json::from_str(&raw).map_err(|e| {
        SmartLinksError::manifest(format!("failed to parse {}: {e}", path.display()))
    })?;

    let base = manifest_dir(path);
    let collections = manifest
        .collections
        .into_iter()
        .map(|record| collection_from_record(record, base))
        .collect::<Result<Vec<_>>>()?;

    check_unique_slugs(&collections)?;
    debug!(collections = collections.len(), "manifest loaded");
    Ok(collections)
}

/// Write collections back to a manifest file, replacing it atomically.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn write_manifest(path: &Path, collections: &[Collection]) -> Result<()> {
    let base = manifest_dir(path);
    let manifest = Manifest {
        collections: collections
            .iter()
            .map(|c| collection_to_record(c, base))
            .collect(),
    };

    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| SmartLinksError::manifest(e.to_string()))?;
    write_atomic(path, &json)
}

// ---------------------------------------------------------------------------
// Record ↔ domain conversion
// ---------------------------------------------------------------------------

fn collection_from_record(record: CollectionRecord, base: &Path) -> Result<Collection> {
    let docs = |records: Vec<DocumentRecord>| -> Result<Vec<Document>> {
        records
            .into_iter()
            .map(|r| document_from_record(r, base))
            .collect()
    };

    Ok(match record {
        CollectionRecord::Articles {
            articles,
            translations,
            drafts,
        } => Collection::articles(docs(articles)?, docs(translations)?, docs(drafts)?),
        CollectionRecord::Pages {
            pages,
            hidden_pages,
        } => Collection::pages(docs(pages)?, docs(hidden_pages)?),
    })
}

fn document_from_record(record: DocumentRecord, base: &Path) -> Result<Document> {
    let mut doc = Document::new(record.slug, record.title, record.content);
    doc.url = record.url;
    if let Some(path) = record.path_no_ext {
        doc.path_no_ext = path;
    }
    if let Some(rel) = record.source_path {
        let path = base.join(rel);
        let text = read_source(&path)?;
        doc.source = Some(SourceFile::new(path, text));
    }
    Ok(doc)
}

fn collection_to_record(collection: &Collection, base: &Path) -> CollectionRecord {
    let records = |docs: &[Document]| -> Vec<DocumentRecord> {
        docs.iter().map(|d| document_to_record(d, base)).collect()
    };

    match collection {
        Collection::Articles {
            articles,
            translations,
            drafts,
        } => CollectionRecord::Articles {
            articles: records(articles),
            translations: records(translations),
            drafts: records(drafts),
        },
        Collection::Pages {
            pages,
            hidden_pages,
        } => CollectionRecord::Pages {
            pages: records(pages),
            hidden_pages: records(hidden_pages),
        },
    }
}

fn document_to_record(doc: &Document, base: &Path) -> DocumentRecord {
    DocumentRecord {
        slug: doc.slug.clone(),
        title: doc.title.clone(),
        content: doc.content.clone(),
        url: doc.url.clone(),
        path_no_ext: (doc.path_no_ext != doc.slug).then(|| doc.path_no_ext.clone()),
        source_path: doc.source.as_ref().map(|s| {
            s.path
                .strip_prefix(base)
                .map_or_else(|_| s.path.clone(), Path::to_path_buf)
        }),
    }
}

fn manifest_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new(""))
}

fn check_unique_slugs(collections: &[Collection]) -> Result<()> {
    let mut seen = HashSet::new();
    for doc in collections.iter().flat_map(|c| c.documents()) {
        if !doc.slug.is_empty() && !seen.insert(doc.slug.as_str()) {
            return Err(SmartLinksError::manifest(format!(
                "duplicate slug '{}'",
                doc.slug
            )));
        }
    }
    Ok(())
}
