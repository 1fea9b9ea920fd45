//! Domain types for the playshelf catalog.
//!
//! This module contains the canonical data structures:
//! - Item: Normalized content record (video or game)
//! - Catalog: Disposable per-request snapshot of all items
//! - ItemSummary: Trimmed presentation subset for callers

pub mod item;

// Re-export commonly used types
pub use item::{Catalog, Item, ItemSummary, ItemType, Language, ScoredItem, SourceKind};
