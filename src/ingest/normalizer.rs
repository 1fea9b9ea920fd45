//! Normalization of raw catalog documents into canonical items.
//!
//! Each source kind has its own raw schema: the kids catalog nests
//! channel → playlist → video, the games catalog nests
//! group → subgroup → game, the streaming catalog nests
//! group → category → video, and the fitness catalog is a flat list.
//! For every leaf content node one `Item` is built, tolerating schema
//! variance within a source by trying an ordered list of alternative raw
//! field names per logical attribute.

use serde_json::Value;
use uuid::Uuid;

use crate::domain::{Item, ItemType, Language, SourceKind};

/// Alternative raw field names per logical attribute, first non-empty wins
const ID_FIELDS: &[&str] = &["id", "video_id", "game_id", "uid"];
const TITLE_FIELDS: &[&str] = &["title", "name", "label"];
const DESCRIPTION_FIELDS: &[&str] = &["description", "desc", "summary"];
const THUMBNAIL_FIELDS: &[&str] = &["thumbnail", "thumb", "image", "poster"];
const URL_FIELDS: &[&str] = &["url", "content_url", "link", "src"];
const DURATION_FIELDS: &[&str] = &["duration_sec", "duration", "length_seconds", "seconds"];
const TAG_FIELDS: &[&str] = &["tags", "keywords"];
const RATING_FIELDS: &[&str] = &["rating", "stars"];
const POPULARITY_FIELDS: &[&str] = &["popularity", "views", "plays"];
const LANGUAGE_FIELDS: &[&str] = &["language", "lang"];
const CATEGORY_FIELDS: &[&str] = &["category", "genre"];
const SUBCATEGORY_FIELDS: &[&str] = &["subcategory", "subgenre"];

/// Fixed per-source defaults applied when a leaf record omits a field
struct SourceDefaults {
    item_type: ItemType,
    duration_sec: u32,
    age_min: u8,
    age_max: u8,
    is_educational: bool,
    /// Tag always attached to items from this source
    implied_tag: Option<&'static str>,
}

fn defaults_for(source: SourceKind) -> SourceDefaults {
    match source {
        // Children's content is always treated as educational with a
        // fixed child age band.
        SourceKind::Kids => SourceDefaults {
            item_type: ItemType::Video,
            duration_sec: 300,
            age_min: 2,
            age_max: 8,
            is_educational: true,
            implied_tag: Some("kids"),
        },
        SourceKind::Games => SourceDefaults {
            item_type: ItemType::Game,
            duration_sec: 600,
            age_min: 4,
            age_max: 12,
            is_educational: false,
            implied_tag: Some("game"),
        },
        SourceKind::Streaming => SourceDefaults {
            item_type: ItemType::Video,
            duration_sec: 1200,
            age_min: 6,
            age_max: 16,
            is_educational: false,
            implied_tag: None,
        },
        SourceKind::Fitness => SourceDefaults {
            item_type: ItemType::Video,
            duration_sec: 900,
            age_min: 10,
            age_max: 99,
            is_educational: false,
            implied_tag: Some("exercise"),
        },
    }
}

/// Normalize a batch of tagged raw documents into one flat item collection.
///
/// Documents that do not match their source's expected shape contribute
/// zero items; ingestion of the remaining sources continues.
pub fn ingest(sources: &[(SourceKind, Value)]) -> Vec<Item> {
    let mut items = Vec::new();

    for (source, document) in sources {
        let before = items.len();
        match source {
            SourceKind::Kids => normalize_kids(document, &mut items),
            SourceKind::Games => normalize_games(document, &mut items),
            SourceKind::Streaming => normalize_streaming(document, &mut items),
            SourceKind::Fitness => normalize_fitness(document, &mut items),
        }

        let count = items.len() - before;
        if count == 0 {
            tracing::warn!(source = %source, "Source document yielded no items");
        } else {
            tracing::debug!(source = %source, count, "Normalized source document");
        }
    }

    items
}

/// Kids catalog: `channels[].playlists[].content[]`
fn normalize_kids(document: &Value, items: &mut Vec<Item>) {
    let Some(channels) = first_array(document, &["channels"]) else {
        return;
    };

    for channel in channels {
        let channel_id = pick_string(channel, ID_FIELDS);
        let channel_category = pick_string(channel, CATEGORY_FIELDS);

        let Some(playlists) = first_array(channel, &["playlists"]) else {
            continue;
        };
        for playlist in playlists {
            let playlist_id = pick_string(playlist, ID_FIELDS);
            let playlist_name = pick_string(playlist, TITLE_FIELDS);
            let playlist_category =
                pick_string(playlist, CATEGORY_FIELDS).or_else(|| channel_category.clone());

            let Some(content) = first_array(playlist, &["content", "videos", "items"]) else {
                continue;
            };
            for record in content {
                let mut item = build_item(record, SourceKind::Kids);
                item.channel_id = channel_id.clone();
                item.playlist_id = playlist_id.clone();
                if item.category.is_none() {
                    item.category = playlist_category.clone();
                }
                if item.subcategory.is_none() {
                    item.subcategory = playlist_name.clone();
                }
                items.push(item);
            }
        }
    }
}

/// Games catalog: `groups[].subgroups[].items[]`
fn normalize_games(document: &Value, items: &mut Vec<Item>) {
    let Some(groups) = first_array(document, &["groups", "content_groups"]) else {
        return;
    };

    for group in groups {
        let group_name = pick_string(group, TITLE_FIELDS);

        let Some(subgroups) = first_array(group, &["subgroups", "subcategories"]) else {
            continue;
        };
        for subgroup in subgroups {
            let subgroup_name = pick_string(subgroup, TITLE_FIELDS);

            let Some(records) = first_array(subgroup, &["items", "games"]) else {
                continue;
            };
            for record in records {
                let mut item = build_item(record, SourceKind::Games);
                if item.category.is_none() {
                    item.category = group_name.clone();
                }
                if item.subcategory.is_none() {
                    item.subcategory = subgroup_name.clone();
                }
                items.push(item);
            }
        }
    }
}

/// Streaming catalog: `groups[].categories[].items[]`
fn normalize_streaming(document: &Value, items: &mut Vec<Item>) {
    let Some(groups) = first_array(document, &["groups"]) else {
        return;
    };

    for group in groups {
        let group_name = pick_string(group, TITLE_FIELDS);

        let Some(categories) = first_array(group, &["categories", "sections"]) else {
            continue;
        };
        for category in categories {
            let category_name = pick_string(category, TITLE_FIELDS);

            let Some(records) = first_array(category, &["items", "videos"]) else {
                continue;
            };
            for record in records {
                let mut item = build_item(record, SourceKind::Streaming);
                if item.category.is_none() {
                    item.category = group_name.clone();
                }
                if item.subcategory.is_none() {
                    item.subcategory = category_name.clone();
                }
                items.push(item);
            }
        }
    }
}

/// Fitness catalog: flat `items[]`
fn normalize_fitness(document: &Value, items: &mut Vec<Item>) {
    let Some(records) = first_array(document, &["items", "videos"]) else {
        return;
    };

    for record in records {
        items.push(build_item(record, SourceKind::Fitness));
    }
}

/// Build one canonical item from a leaf content node
fn build_item(record: &Value, source: SourceKind) -> Item {
    let defaults = defaults_for(source);

    // Items lacking a raw id get a fresh one per ingest; unstable across
    // reloads, kept for compatibility with existing callers.
    let id = pick_string(record, ID_FIELDS)
        .map(|raw| format!("{}-{}", source, raw))
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut tags = sanitize_tags(pick_string_list(record, TAG_FIELDS));
    if let Some(implied) = defaults.implied_tag {
        if !tags.iter().any(|t| t == implied) {
            tags.push(implied.to_string());
        }
    }

    let (mut age_min, mut age_max) = (
        pick_u64(record, &["age_min", "min_age"])
            .map(|v| v.min(u8::MAX as u64) as u8)
            .unwrap_or(defaults.age_min),
        pick_u64(record, &["age_max", "max_age"])
            .map(|v| v.min(u8::MAX as u64) as u8)
            .unwrap_or(defaults.age_max),
    );
    if age_min > age_max {
        std::mem::swap(&mut age_min, &mut age_max);
    }

    let language = pick_string(record, LANGUAGE_FIELDS)
        .and_then(|s| s.parse::<Language>().ok())
        .unwrap_or(Language::En);

    let is_educational = defaults.is_educational
        || record
            .get("is_educational")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        || tags.iter().any(|t| t == "educational");

    Item {
        id,
        item_type: defaults.item_type,
        source,
        title: pick_string(record, TITLE_FIELDS).unwrap_or_default(),
        description: pick_string(record, DESCRIPTION_FIELDS).unwrap_or_default(),
        tags,
        age_min,
        age_max,
        language,
        duration_sec: pick_u64(record, DURATION_FIELDS)
            .map(|v| v.min(u32::MAX as u64) as u32)
            .unwrap_or(defaults.duration_sec),
        is_educational,
        thumbnail: pick_string(record, THUMBNAIL_FIELDS),
        content_url: pick_string(record, URL_FIELDS),
        rating: pick_f64(record, RATING_FIELDS)
            .map(|v| v.clamp(0.0, 5.0) as f32)
            .unwrap_or(0.0),
        popularity: pick_u64(record, POPULARITY_FIELDS)
            .map(|v| v.min(u32::MAX as u64) as u32)
            .unwrap_or(0),
        channel_id: None,
        playlist_id: None,
        category: pick_string(record, CATEGORY_FIELDS),
        subcategory: pick_string(record, SUBCATEGORY_FIELDS),
    }
}

/// First non-empty string among the alternative field names
fn pick_string(value: &Value, fields: &[&str]) -> Option<String> {
    for field in fields {
        if let Some(s) = value.get(field).and_then(Value::as_str) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// First array among the alternative field names
fn first_array<'a>(value: &'a Value, fields: &[&str]) -> Option<&'a Vec<Value>> {
    for field in fields {
        if let Some(array) = value.get(field).and_then(Value::as_array) {
            return Some(array);
        }
    }
    None
}

/// First string list among the alternative field names
fn pick_string_list(value: &Value, fields: &[&str]) -> Vec<String> {
    for field in fields {
        if let Some(array) = value.get(field).and_then(Value::as_array) {
            return array
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
        }
    }
    Vec::new()
}

/// First non-negative integer among the alternative field names
fn pick_u64(value: &Value, fields: &[&str]) -> Option<u64> {
    for field in fields {
        if let Some(v) = value.get(field) {
            if let Some(n) = v.as_u64() {
                return Some(n);
            }
            // Numbers arriving as strings are common in these feeds
            if let Some(parsed) = v.as_str().and_then(|s| s.trim().parse::<u64>().ok()) {
                return Some(parsed);
            }
        }
    }
    None
}

/// First float among the alternative field names
fn pick_f64(value: &Value, fields: &[&str]) -> Option<f64> {
    for field in fields {
        if let Some(v) = value.get(field) {
            if let Some(n) = v.as_f64() {
                return Some(n);
            }
            if let Some(parsed) = v.as_str().and_then(|s| s.trim().parse::<f64>().ok()) {
                return Some(parsed);
            }
        }
    }
    None
}

/// Lowercase, trim, drop empties, dedupe (first occurrence wins)
fn sanitize_tags(raw: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let cleaned = tag.trim().to_lowercase();
        if !cleaned.is_empty() && !tags.contains(&cleaned) {
            tags.push(cleaned);
        }
    }
    tags
}
