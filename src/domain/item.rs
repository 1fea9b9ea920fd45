//! Canonical content records.
//!
//! Every source document, whatever its raw shape, normalizes into flat
//! `Item` records. Items are immutable once created: ranking state lives
//! in `ScoredItem` pairs, never on the item itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type of content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Playable video
    Video,

    /// HTML5 game
    Game,
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemType::Video => write!(f, "video"),
            ItemType::Game => write!(f, "game"),
        }
    }
}

impl std::str::FromStr for ItemType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        // Trailing-s plurals are accepted ("videos", "games")
        match s.to_lowercase().trim_end_matches('s') {
            "video" => Ok(ItemType::Video),
            "game" => Ok(ItemType::Game),
            _ => anyhow::bail!("Unknown content type: {}", s),
        }
    }
}

/// Which catalog a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Children's video channels (channel → playlist → video trees)
    Kids,

    /// HTML5 games (group → subgroup → game trees)
    Games,

    /// General streaming video (group → category → video trees)
    Streaming,

    /// Fitness videos (flat list)
    Fitness,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Kids => write!(f, "kids"),
            SourceKind::Games => write!(f, "games"),
            SourceKind::Streaming => write!(f, "streaming"),
            SourceKind::Fitness => write!(f, "fitness"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "kids" => Ok(SourceKind::Kids),
            "games" => Ok(SourceKind::Games),
            "streaming" => Ok(SourceKind::Streaming),
            "fitness" => Ok(SourceKind::Fitness),
            _ => anyhow::bail!("Unknown source kind: {}", s),
        }
    }
}

/// Content language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    En,
    Ar,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Ar => write!(f, "ar"),
        }
    }
}

impl std::str::FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "ar" | "arabic" => Ok(Language::Ar),
            _ => anyhow::bail!("Unknown language: {}", s),
        }
    }
}

/// A normalized content record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Stable unique key; derived from the source record's own id when present
    pub id: String,

    /// Video or game
    pub item_type: ItemType,

    /// Catalog the record came from
    pub source: SourceKind,

    /// Human-readable title
    pub title: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Sanitized tags (lowercase, trimmed, deduped)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Lower bound of the suitable age band
    pub age_min: u8,

    /// Upper bound of the suitable age band (>= age_min)
    pub age_max: u8,

    /// Content language
    pub language: Language,

    /// Duration in seconds (0 when unknown for the source)
    pub duration_sec: u32,

    /// Whether the item is educational content
    pub is_educational: bool,

    /// Thumbnail URL, if the source provides one
    pub thumbnail: Option<String>,

    /// Playable content URL, if the source provides one
    pub content_url: Option<String>,

    /// Rating in [0, 5]
    pub rating: f32,

    /// Popularity counter (views, plays)
    pub popularity: u32,

    /// Owning channel, for channel-organized sources
    pub channel_id: Option<String>,

    /// Owning playlist, for playlist-organized sources
    pub playlist_id: Option<String>,

    /// Classification label, explicit or inferred from source structure
    pub category: Option<String>,

    /// Finer classification label
    pub subcategory: Option<String>,
}

impl Item {
    /// Combined searchable text: title, description, and tags, lowercased.
    pub fn combined_text(&self) -> String {
        let mut text = String::with_capacity(
            self.title.len() + self.description.len() + self.tags.len() * 8 + 2,
        );
        text.push_str(&self.title);
        text.push(' ');
        text.push_str(&self.description);
        text.push(' ');
        text.push_str(&self.tags.join(" "));
        text.to_lowercase()
    }

    /// Check if the item carries a tag (tags are stored lowercased)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Unconditional safety gate: adult or violent content never surfaces.
    pub fn is_safe(&self) -> bool {
        !self.has_tag("adult") && !self.has_tag("violence")
    }

    /// Age containment check against a requested age
    pub fn suits_age(&self, age: u8) -> bool {
        self.age_min <= age && age <= self.age_max
    }

    /// Trim to the presentation subset
    pub fn summary(&self) -> ItemSummary {
        ItemSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            item_type: self.item_type,
            source: self.source,
            age_min: self.age_min,
            age_max: self.age_max,
            duration_sec: self.duration_sec,
            thumbnail: self.thumbnail.clone(),
            category: self.category.clone(),
            channel_id: self.channel_id.clone(),
            playlist_id: self.playlist_id.clone(),
        }
    }
}

/// Presentation subset of an item: enough for the caller to render a
/// result row and construct a detail link without re-querying the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: String,
    pub title: String,
    pub item_type: ItemType,
    pub source: SourceKind,
    pub age_min: u8,
    pub age_max: u8,
    pub duration_sec: u32,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub channel_id: Option<String>,
    pub playlist_id: Option<String>,
}

/// An item index paired with its computed score.
///
/// Scores are transient ranking state and never stored on `Item`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredItem {
    /// Index into the catalog's item vector
    pub index: usize,

    /// Additive score from the scoring stage
    pub score: f64,
}

/// Snapshot of all normalized items for one logical request.
///
/// Rebuilt wholesale from source documents on each use; read-only for the
/// remainder of the request that built it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// All normalized items
    pub items: Vec<Item>,

    /// When this snapshot was assembled
    pub built_at: DateTime<Utc>,
}

impl Catalog {
    /// Wrap a normalized item collection into a snapshot
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            built_at: Utc::now(),
        }
    }

    /// Number of items in the snapshot
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> Item {
        Item {
            id: "kids-abc1".to_string(),
            item_type: ItemType::Video,
            source: SourceKind::Kids,
            title: "ABC Song".to_string(),
            description: "Learn the alphabet".to_string(),
            tags: vec!["alphabet".to_string(), "educational".to_string()],
            age_min: 2,
            age_max: 8,
            language: Language::En,
            duration_sec: 180,
            is_educational: true,
            thumbnail: None,
            content_url: None,
            rating: 4.5,
            popularity: 1200,
            channel_id: Some("ch1".to_string()),
            playlist_id: Some("pl1".to_string()),
            category: Some("alphabet".to_string()),
            subcategory: None,
        }
    }

    #[test]
    fn test_item_type_from_str_accepts_plurals() {
        assert_eq!("video".parse::<ItemType>().unwrap(), ItemType::Video);
        assert_eq!("videos".parse::<ItemType>().unwrap(), ItemType::Video);
        assert_eq!("Games".parse::<ItemType>().unwrap(), ItemType::Game);
        assert!("music".parse::<ItemType>().is_err());
    }

    #[test]
    fn test_safety_gate() {
        let mut item = sample_item();
        assert!(item.is_safe());

        item.tags.push("violence".to_string());
        assert!(!item.is_safe());
    }

    #[test]
    fn test_age_containment() {
        let item = sample_item();
        assert!(item.suits_age(2));
        assert!(item.suits_age(5));
        assert!(item.suits_age(8));
        assert!(!item.suits_age(9));
    }

    #[test]
    fn test_combined_text_is_lowercased() {
        let item = sample_item();
        let text = item.combined_text();
        assert!(text.contains("abc song"));
        assert!(text.contains("alphabet"));
    }

    #[test]
    fn test_summary_keeps_linking_identifiers() {
        let summary = sample_item().summary();
        assert_eq!(summary.channel_id.as_deref(), Some("ch1"));
        assert_eq!(summary.playlist_id.as_deref(), Some("pl1"));
        assert_eq!(summary.duration_sec, 180);
    }
}
