//! Core catalog logic.
//!
//! This module contains:
//! - CatalogIndex: Degrading multi-key lookup over an item collection
//! - Recommender: Filter → score → rank → limit pipeline
//! - CategoryMatcher: Free text to category resolution

pub mod index;
pub mod matcher;
pub mod recommend;

// Re-export commonly used types
pub use index::{CatalogIndex, IndexKey, SourceValues};
pub use matcher::CategoryMatcher;
pub use recommend::{Criteria, Recommender};
