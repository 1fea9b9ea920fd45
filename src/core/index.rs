//! Degrading multi-key index over a normalized item collection.
//!
//! Every item is registered under four composite keys of decreasing
//! specificity, so a caller can query the most specific key first and retry
//! progressively coarser keys on a miss. Whenever the catalog holds any item
//! of a given `(language, type)` pair the coarsest key is guaranteed to hit.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::{Item, ItemType, Language, SourceKind};

/// Composite lookup key; unset fields widen the key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexKey {
    pub source: Option<SourceKind>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub channel: Option<String>,
    pub playlist: Option<String>,
    pub language: Language,
    pub item_type: ItemType,
}

impl IndexKey {
    /// Coarsest key: language and type only
    pub fn broad(language: Language, item_type: ItemType) -> Self {
        Self {
            source: None,
            category: None,
            subcategory: None,
            channel: None,
            playlist: None,
            language,
            item_type,
        }
    }

    /// The four keys an item is registered under, most specific first
    fn degradation_of(item: &Item) -> [IndexKey; 4] {
        let full = IndexKey {
            source: Some(item.source),
            category: item.category.as_ref().map(|c| c.to_lowercase()),
            subcategory: item.subcategory.as_ref().map(|c| c.to_lowercase()),
            channel: item.channel_id.clone(),
            playlist: item.playlist_id.clone(),
            language: item.language,
            item_type: item.item_type,
        };
        let without_detail = IndexKey {
            subcategory: None,
            channel: None,
            playlist: None,
            ..full.clone()
        };
        let source_only = IndexKey {
            category: None,
            ..without_detail.clone()
        };
        let broad = IndexKey {
            source: None,
            ..source_only.clone()
        };
        [full, without_detail, source_only, broad]
    }

    /// The degradation ladder for a query key, most specific first
    pub fn degradation(&self) -> [IndexKey; 4] {
        let full = IndexKey {
            category: self.category.as_ref().map(|c| c.to_lowercase()),
            subcategory: self.subcategory.as_ref().map(|c| c.to_lowercase()),
            ..self.clone()
        };
        let without_detail = IndexKey {
            subcategory: None,
            channel: None,
            playlist: None,
            ..full.clone()
        };
        let source_only = IndexKey {
            category: None,
            ..without_detail.clone()
        };
        let broad = IndexKey {
            source: None,
            ..source_only.clone()
        };
        [full, without_detail, source_only, broad]
    }
}

/// Observed classification values for one source, sorted and deduped
#[derive(Debug, Clone, Default)]
pub struct SourceValues {
    pub categories: BTreeSet<String>,
    pub subcategories: BTreeSet<String>,
    pub channels: BTreeSet<String>,
    pub playlists: BTreeSet<String>,
    pub languages: BTreeSet<Language>,
}

/// Read-only lookup structures over one item collection.
///
/// Built in a single pass; disposable alongside the catalog snapshot that
/// produced it.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    by_key: HashMap<IndexKey, Vec<usize>>,
    per_source: BTreeMap<SourceKind, SourceValues>,
}

impl CatalogIndex {
    /// Build the index from a normalized item collection
    pub fn build(items: &[Item]) -> Self {
        let mut index = Self::default();

        for (position, item) in items.iter().enumerate() {
            let values = index.per_source.entry(item.source).or_default();
            if let Some(category) = &item.category {
                values.categories.insert(category.to_lowercase());
            }
            if let Some(subcategory) = &item.subcategory {
                values.subcategories.insert(subcategory.to_lowercase());
            }
            if let Some(channel) = &item.channel_id {
                values.channels.insert(channel.clone());
            }
            if let Some(playlist) = &item.playlist_id {
                values.playlists.insert(playlist.clone());
            }
            values.languages.insert(item.language);

            // Levels collapse into the same key when optional fields are
            // absent; register each distinct key once per item
            let keys = IndexKey::degradation_of(item);
            for (level, key) in keys.iter().enumerate() {
                if keys[..level].contains(key) {
                    continue;
                }
                index.by_key.entry(key.clone()).or_default().push(position);
            }
        }

        index
    }

    /// Item positions registered under an exact key
    pub fn lookup(&self, key: &IndexKey) -> &[usize] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Walk the degradation ladder; first non-empty level wins.
    ///
    /// Non-empty whenever the catalog contains any item with the key's
    /// language and type.
    pub fn lookup_degrading(&self, key: &IndexKey) -> &[usize] {
        for candidate in key.degradation() {
            let positions = self.lookup(&candidate);
            if !positions.is_empty() {
                tracing::debug!(?candidate, count = positions.len(), "Index key matched");
                return positions;
            }
        }
        &[]
    }

    /// Observed values per source, for discovery and debugging
    pub fn source_values(&self) -> &BTreeMap<SourceKind, SourceValues> {
        &self.per_source
    }

    /// Number of distinct composite keys
    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }
}
