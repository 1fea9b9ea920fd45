//! Recommendation Pipeline Integration Tests
//!
//! Catalog-level properties: safety exclusion under any filter combination,
//! age containment, the degradation guarantee, and the documented
//! playlist/suggestion scenarios.

use playshelf::{
    Criteria, Item, ItemType, Language, Recommender, RecommenderConfig, SourceKind,
};

fn item(id: &str, source: SourceKind, item_type: ItemType) -> Item {
    Item {
        id: id.to_string(),
        item_type,
        source,
        title: id.to_string(),
        description: String::new(),
        tags: Vec::new(),
        age_min: 2,
        age_max: 12,
        language: Language::En,
        duration_sec: 300,
        is_educational: false,
        thumbnail: None,
        content_url: None,
        rating: 3.0,
        popularity: 100,
        channel_id: None,
        playlist_id: None,
        category: None,
        subcategory: None,
    }
}

fn mixed_catalog() -> Vec<Item> {
    let mut items = Vec::new();

    let mut violent = item("streaming-bad", SourceKind::Streaming, ItemType::Video);
    violent.tags = vec!["action".to_string(), "violence".to_string()];
    items.push(violent);

    let mut adult = item("streaming-adult", SourceKind::Streaming, ItemType::Video);
    adult.tags = vec!["adult".to_string()];
    items.push(adult);

    let mut alphabet = item("kids-abc", SourceKind::Kids, ItemType::Video);
    alphabet.tags = vec!["alphabet".to_string(), "educational".to_string()];
    alphabet.category = Some("alphabet".to_string());
    alphabet.is_educational = true;
    alphabet.age_min = 3;
    alphabet.age_max = 8;
    items.push(alphabet);

    let mut puzzle = item("games-puzzle", SourceKind::Games, ItemType::Game);
    puzzle.tags = vec!["puzzle".to_string()];
    puzzle.age_min = 6;
    puzzle.age_max = 12;
    items.push(puzzle);

    let mut arabic = item("kids-ar", SourceKind::Kids, ItemType::Video);
    arabic.language = Language::Ar;
    arabic.is_educational = true;
    items.push(arabic);

    items
}

fn recommender(items: &[Item]) -> Recommender<'_> {
    Recommender::new(items, RecommenderConfig::default())
}

#[test]
fn test_unsafe_items_never_appear_under_any_filter_combination() {
    let items = mixed_catalog();
    let rec = recommender(&items);

    let filter_sets = vec![
        Criteria::default(),
        Criteria {
            source: Some(SourceKind::Streaming),
            ..Criteria::default()
        },
        Criteria {
            item_type: Some(ItemType::Video),
            language: Some(Language::En),
            ..Criteria::default()
        },
        Criteria {
            age: Some(10),
            ..Criteria::default()
        },
    ];

    for criteria in filter_sets {
        for result in [
            rec.search_by_metadata(&criteria, 100),
            rec.suggest_for_child(&criteria, 100),
            rec.search_structured(&criteria, 100, Some(3)),
        ] {
            assert!(
                result.iter().all(|i| !i.has_tag("adult") && !i.has_tag("violence")),
                "unsafe item leaked for {:?}",
                criteria
            );
        }
    }

    // Even asking for the tag directly finds nothing
    assert!(rec.suggest_by_category("violence", None, 100).is_empty());
}

#[test]
fn test_age_filter_containment_property() {
    let items = mixed_catalog();
    let rec = recommender(&items);

    for age in 0..=16u8 {
        let criteria = Criteria {
            age: Some(age),
            ..Criteria::default()
        };
        for found in rec.suggest_for_child(&criteria, 100) {
            assert!(
                found.age_min <= age && age <= found.age_max,
                "item {} out of band for age {}",
                found.id,
                age
            );
        }
    }
}

#[test]
fn test_degradation_guarantee_for_over_specific_filters() {
    let items = mixed_catalog();
    let rec = recommender(&items);

    // No kids game with this category exists; the ladder must still land
    // on something because safe videos exist for (En, Video)
    let criteria = Criteria {
        source: Some(SourceKind::Fitness),
        category: Some("archery".to_string()),
        subcategory: Some("outdoor".to_string()),
        language: Some(Language::En),
        item_type: Some(ItemType::Video),
        ..Criteria::default()
    };

    let results = rec.search_structured(&criteria, 10, Some(9));
    assert!(!results.is_empty());
    assert!(results.iter().all(|i| i.language == Language::En));
    assert!(results.iter().all(|i| i.item_type == ItemType::Video));
}

#[test]
fn test_single_alphabet_item_scenario() {
    let mut alphabet = item("kids-abc", SourceKind::Kids, ItemType::Video);
    alphabet.tags = vec!["alphabet".to_string(), "educational".to_string()];
    alphabet.category = Some("alphabet".to_string());
    alphabet.age_min = 3;
    alphabet.age_max = 8;
    let items = vec![alphabet];
    let rec = recommender(&items);

    let results = rec.suggest_by_category("alphabet", Some(ItemType::Video), 5);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "kids-abc");
}

#[test]
fn test_playlist_packs_two_of_five_for_ten_minute_target() {
    let items: Vec<Item> = (0..5)
        .map(|i| {
            let mut v = item(&format!("kids-v{}", i), SourceKind::Kids, ItemType::Video);
            v.is_educational = true;
            v.duration_sec = 300;
            v
        })
        .collect();
    let rec = recommender(&items);

    let playlist = rec.build_educational_playlist(5, Language::En, 10, 10);
    assert_eq!(playlist.len(), 2);
    assert_eq!(playlist.iter().map(|i| i.duration_sec).sum::<u32>(), 600);
}

#[test]
fn test_plural_content_type_strings_normalize() {
    assert_eq!("videos".parse::<ItemType>().unwrap(), ItemType::Video);
    assert_eq!("games".parse::<ItemType>().unwrap(), ItemType::Game);
}

#[test]
fn test_structured_search_shuffle_varies_but_stays_bounded() {
    let items: Vec<Item> = (0..30)
        .map(|i| item(&format!("v{:02}", i), SourceKind::Streaming, ItemType::Video))
        .collect();
    let rec = recommender(&items);

    let a = rec.search_structured(&Criteria::default(), 5, Some(1));
    let b = rec.search_structured(&Criteria::default(), 5, Some(2));
    assert_eq!(a.len(), 5);
    assert_eq!(b.len(), 5);

    // Different seeds may reorder, but both draws come from the top 2×max
    // candidates, which here all score equally; membership is the catalog
    let ids = |r: &[Item]| r.iter().map(|i| i.id.clone()).collect::<Vec<_>>();
    let same_seed = rec.search_structured(&Criteria::default(), 5, Some(1));
    assert_eq!(ids(&a), ids(&same_seed));
}
