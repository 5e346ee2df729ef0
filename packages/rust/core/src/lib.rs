//! Core link resolution for SmartLinks.
//!
//! This crate ties together corpus indexing, relevance-based candidate
//! selection, and link rewriting into a single run over a pipeline's
//! collections (`pipeline::resolve_links`).

pub mod corpus;
pub mod manifest;
pub mod pipeline;
pub mod rewrite;
pub mod select;
pub mod source;
