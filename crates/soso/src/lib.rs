//! Public facade crate for `soso`.
//!
//! Re-exports the backend-agnostic types/traits from `soso-core` and the local pipeline
//! entry points from `soso-local`, so embedders depend on one crate.

pub use soso_core::*;
pub use soso_local::{
    extract_main, html_title, main_content, rank_keywords, ContentBounds, DictSegmenter,
    Dictionary, Document, DocumentSummary, ExtractCfg, StopwordSet,
};
