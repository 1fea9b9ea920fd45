//! Configuration for matching and scoring.
//!
//! Configuration sources (highest priority first):
//! 1. Explicit config file passed by the caller (YAML)
//! 2. Built-in defaults
//!
//! All tables are plain immutable data injected at construction so that
//! deployments can customize synonyms and scoring keywords without code
//! changes, and so tests can supply their own small tables.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub matcher: Option<MatcherSection>,
    #[serde(default)]
    pub recommender: Option<RecommenderSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatcherSection {
    /// Category → synonym phrases (any language)
    #[serde(default)]
    pub synonyms: BTreeMap<String, Vec<String>>,
    /// Category returned when nothing else resolves
    pub default_category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommenderSection {
    /// Keywords that earn a small per-hit score bonus
    #[serde(default)]
    pub bonus_keywords: Vec<String>,
    /// Mood name → tags that earn the mood bonus
    #[serde(default)]
    pub mood_tags: BTreeMap<String, Vec<String>>,
}

/// Resolved configuration with all tables populated
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub matcher: MatcherConfig,
    pub recommender: RecommenderConfig,
}

/// Category resolution tables
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Category → synonym phrases, multi-language
    pub synonyms: BTreeMap<String, Vec<String>>,

    /// Fallback category when no signal resolves
    pub default_category: String,
}

/// Scoring tables for the recommendation pipeline
#[derive(Debug, Clone)]
pub struct RecommenderConfig {
    /// Keywords that earn +0.3 per occurrence in an item's combined text
    pub bonus_keywords: Vec<String>,

    /// Mood name → (tags that trigger the bonus, bonus value)
    pub mood_tags: BTreeMap<String, (Vec<String>, f64)>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            synonyms: default_synonyms(),
            default_category: "educational".to_string(),
        }
    }
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            bonus_keywords: default_bonus_keywords(),
            mood_tags: default_mood_tags(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            recommender: RecommenderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration, merging an optional YAML file over the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let file: ConfigFile = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.merge(file);
        }

        Ok(config)
    }

    /// Overlay file-provided sections onto the defaults
    fn merge(&mut self, file: ConfigFile) {
        if let Some(matcher) = file.matcher {
            if !matcher.synonyms.is_empty() {
                self.matcher.synonyms = matcher.synonyms;
            }
            if let Some(default_category) = matcher.default_category {
                self.matcher.default_category = default_category;
            }
        }
        if let Some(recommender) = file.recommender {
            if !recommender.bonus_keywords.is_empty() {
                self.recommender.bonus_keywords = recommender.bonus_keywords;
            }
            if !recommender.mood_tags.is_empty() {
                // File-provided mood tables use the standard 1.0 bonus
                self.recommender.mood_tags = recommender
                    .mood_tags
                    .into_iter()
                    .map(|(mood, tags)| (mood, (tags, 1.0)))
                    .collect();
            }
        }
    }
}

/// Built-in bilingual synonym table (English + Arabic phrases per category)
fn default_synonyms() -> BTreeMap<String, Vec<String>> {
    let entries: &[(&str, &[&str])] = &[
        (
            "alphabet",
            &["alphabet", "letters", "abc", "phonics", "حروف", "الحروف"],
        ),
        (
            "numbers",
            &["numbers", "counting", "math", "123", "ارقام", "الارقام", "عد"],
        ),
        (
            "animals",
            &["animal", "animals", "dinosaur", "dinosaurs", "zoo", "حيوان", "حيوانات"],
        ),
        (
            "music",
            &["music", "song", "songs", "nursery rhyme", "rhymes", "اغاني", "موسيقى"],
        ),
        (
            "stories",
            &["story", "stories", "tale", "bedtime", "قصة", "قصص", "حكاية"],
        ),
        (
            "science",
            &["science", "experiment", "space", "planets", "علوم", "تجارب"],
        ),
        (
            "shapes",
            &["shape", "shapes", "colors", "colours", "اشكال", "الوان"],
        ),
        (
            "educational",
            &["educational", "learning", "learn", "school", "تعليمي", "تعلم"],
        ),
        (
            "exercise",
            &["exercise", "workout", "fitness", "dance", "yoga", "رياضة", "تمارين"],
        ),
    ];

    entries
        .iter()
        .map(|(category, phrases)| {
            (
                category.to_string(),
                phrases.iter().map(|p| p.to_string()).collect(),
            )
        })
        .collect()
}

/// Keywords rewarded during scoring (+0.3 each)
fn default_bonus_keywords() -> Vec<String> {
    ["educational", "learning", "abc", "math", "shapes", "phonics", "science"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

/// Mood → (trigger tags, bonus)
fn default_mood_tags() -> BTreeMap<String, (Vec<String>, f64)> {
    let mut map = BTreeMap::new();
    map.insert(
        "learning".to_string(),
        (vec!["educational".to_string()], 1.5),
    );
    map.insert(
        "calm".to_string(),
        (vec!["music".to_string(), "story".to_string()], 1.0),
    );
    map.insert(
        "active".to_string(),
        (
            vec!["dance".to_string(), "exercise".to_string(), "game".to_string()],
            1.0,
        ),
    );
    map
}
