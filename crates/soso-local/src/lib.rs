//! Local implementations of the soso analysis pipeline.
//!
//! Everything here is synchronous and in-process: the only I/O is loading the dictionary
//! and stopword files during setup.

pub mod document;
pub mod extract;
pub mod rank;
pub mod segment;
pub mod stopwords;

pub use document::{Document, DocumentSummary};
pub use extract::{extract_main, html_title, main_content, ContentBounds, ExtractCfg};
pub use rank::rank_keywords;
pub use segment::{DictSegmenter, Dictionary};
pub use stopwords::StopwordSet;
