//! Catalog ingestion pipeline.
//!
//! This module turns heterogeneous raw catalog documents into the canonical
//! `Item` collection:
//!
//! 1. **Loader**: Reads source documents from disk, tagged with an explicit
//!    `SourceKind` supplied by the caller (never inferred from filenames)
//! 2. **Normalizer**: Walks each document's source-specific shape and emits
//!    flat `Item` records
//!
//! Ingestion degrades rather than fails: an unreadable or malformed source
//! is logged and skipped, and the remaining sources still contribute to the
//! catalog.

pub mod loader;
pub mod normalizer;

// Re-export key types
pub use loader::{load_sources, SourceError, SourceSpec};
pub use normalizer::ingest;
