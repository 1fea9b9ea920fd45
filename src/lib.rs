//! playshelf - Content catalog and recommendation core
//!
//! Ingests structurally different content catalogs (children's video
//! channels, HTML5 games, streaming video, fitness videos), normalizes them
//! into one canonical item model, indexes them for filtered lookup, and
//! ranks items for recommendation, category browsing, and playlist
//! building.
//!
//! # Architecture
//!
//! Everything is snapshot-based:
//! - Catalogs are rebuilt wholesale from source documents per request
//! - Items and indexes are immutable once built
//! - Broken sources degrade the catalog instead of failing the request
//!
//! # Modules
//!
//! - `ingest`: Source document loading and normalization
//! - `core`: Index, recommendation pipeline, category matching
//! - `domain`: Data structures (Item, Catalog, summaries)
//! - `config`: Injectable synonym and scoring tables
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Suggestions for a six year old
//! playshelf suggest --source kids=kids.json --age 6 --mood learning
//!
//! # Resolve free text to a category
//! playshelf resolve "dinosaurs and animals" --categories animals,numbers
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod ingest;

// Re-export main types at crate root for convenience
pub use config::{AppConfig, MatcherConfig, RecommenderConfig};
pub use core::{CatalogIndex, CategoryMatcher, Criteria, IndexKey, Recommender};
pub use domain::{Catalog, Item, ItemSummary, ItemType, Language, ScoredItem, SourceKind};
pub use ingest::{ingest, load_sources, SourceSpec};
