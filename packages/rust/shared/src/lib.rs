//! Shared types, error model, and configuration for SmartLinks.
//!
//! This crate is the foundation depended on by all other SmartLinks crates.
//! It provides:
//! - [`SmartLinksError`] — the unified error type
//! - Domain types ([`Document`], [`DocumentKind`], [`Collection`], [`SourceFile`])
//! - Configuration ([`AppConfig`], [`LinkOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, LinkOptions, LinksConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{Result, SmartLinksError};
pub use types::{Collection, Document, DocumentKind, SourceFile};
