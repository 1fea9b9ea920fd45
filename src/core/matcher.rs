//! Free-text to category resolution.
//!
//! Maps arbitrary user text onto one label from a known category vocabulary
//! using a configured bilingual synonym table, with substring and fuzzy
//! fallbacks. Pure and deterministic: same text, vocabulary, and table
//! always resolve the same way.

use crate::config::MatcherConfig;

/// Similarity floor below which the fuzzy fallback is not trusted
const MIN_SIMILARITY: f64 = 0.2;

/// Resolves free text to a category from a supplied vocabulary
#[derive(Debug, Clone)]
pub struct CategoryMatcher {
    config: MatcherConfig,
}

impl Default for CategoryMatcher {
    fn default() -> Self {
        Self::new(MatcherConfig::default())
    }
}

impl CategoryMatcher {
    /// Create a matcher over an injected synonym table
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Correct a requested category against the vocabulary.
    ///
    /// Exact and case-insensitive members pass through as spelled in the
    /// vocabulary; anything else goes through the full resolution chain.
    /// A requested category is never rejected.
    pub fn resolve_category(&self, requested: &str, available: &[String]) -> String {
        let wanted = requested.trim().to_lowercase();
        if let Some(member) = available.iter().find(|c| c.to_lowercase() == wanted) {
            return member.clone();
        }
        self.pick_category(requested, available)
    }

    /// Pick the best category for arbitrary free text.
    ///
    /// Resolution order, first success wins:
    /// 1. Synonym phrase substring scoring (total matched phrase length as
    ///    a specificity proxy)
    /// 2. Category name substring match
    /// 3. Maximum percent similarity against category names
    /// 4. Configured default if present in the vocabulary, else the first
    ///    vocabulary entry
    ///
    /// Always returns a member of a non-empty `available` list.
    pub fn pick_category(&self, text: &str, available: &[String]) -> String {
        if available.is_empty() {
            return self.config.default_category.clone();
        }

        let normalized = normalize(text);

        if let Some(category) = self.best_synonym_match(&normalized, available) {
            return category;
        }

        if let Some(category) = self.best_name_substring(&normalized, available) {
            return category;
        }

        if let Some(category) = self.best_fuzzy_match(&normalized, available) {
            return category;
        }

        available
            .iter()
            .find(|c| c.to_lowercase() == self.config.default_category.to_lowercase())
            .unwrap_or(&available[0])
            .clone()
    }

    /// Sum the length of every configured synonym phrase found in the text;
    /// highest positive total wins. Longer phrases outweigh short generic
    /// ones.
    fn best_synonym_match(&self, normalized: &str, available: &[String]) -> Option<String> {
        let mut best: Option<(&String, usize)> = None;

        for category in available {
            let Some(phrases) = self.config.synonyms.get(&category.to_lowercase()) else {
                continue;
            };

            let total: usize = phrases
                .iter()
                .map(|phrase| normalize(phrase))
                .filter(|phrase| !phrase.is_empty() && normalized.contains(phrase.as_str()))
                .map(|phrase| phrase.chars().count())
                .sum();

            if total > 0 && best.map_or(true, |(_, score)| total > score) {
                best = Some((category, total));
            }
        }

        best.map(|(category, score)| {
            tracing::debug!(category = %category, score, "Synonym table resolved category");
            category.clone()
        })
    }

    /// Longest category name that appears verbatim in the text
    fn best_name_substring(&self, normalized: &str, available: &[String]) -> Option<String> {
        available
            .iter()
            .filter(|category| {
                let name = normalize(category);
                !name.is_empty() && normalized.contains(name.as_str())
            })
            .max_by_key(|category| normalize(category).chars().count())
            .cloned()
    }

    /// Closest category name by normalized Levenshtein similarity
    fn best_fuzzy_match(&self, normalized: &str, available: &[String]) -> Option<String> {
        let (category, similarity) = available
            .iter()
            .map(|category| {
                (
                    category,
                    strsim::normalized_levenshtein(normalized, &normalize(category)),
                )
            })
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))?;

        if similarity < MIN_SIMILARITY {
            return None;
        }

        tracing::debug!(category = %category, similarity, "Fuzzy matched category");
        Some(category.clone())
    }
}

/// Normalize text for matching: lowercase, fold Latin diacritics, strip
/// Arabic combining marks and tatweel, replace punctuation with spaces,
/// collapse whitespace.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for ch in text.to_lowercase().chars() {
        match ch {
            // Arabic harakat, Quranic marks, and tatweel carry no lexical
            // information for matching
            '\u{0610}'..='\u{061A}' | '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{0640}' => {}
            c if c.is_alphanumeric() => {
                if ('\u{00C0}'..='\u{024F}').contains(&c) {
                    out.push_str(deunicode::deunicode_char(c).unwrap_or(""));
                } else {
                    out.push(c);
                }
            }
            _ => out.push(' '),
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> Vec<String> {
        ["animals", "numbers", "alphabet"]
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    #[test]
    fn test_normalize_strips_punctuation_and_diacritics() {
        assert_eq!(normalize("  Héllo,   WORLD!! "), "hello world");
        // Arabic harakat removed, letters kept
        assert_eq!(normalize("حُرُوف"), "حروف");
    }

    #[test]
    fn test_synonym_match_wins() {
        let matcher = CategoryMatcher::default();
        let picked = matcher.pick_category(
            "I want to watch some dinosaurs and animals",
            &vocabulary(),
        );
        assert_eq!(picked, "animals");
    }

    #[test]
    fn test_arabic_synonym_match() {
        let matcher = CategoryMatcher::default();
        let picked = matcher.pick_category("اريد حيوانات من فضلك", &vocabulary());
        assert_eq!(picked, "animals");
    }

    #[test]
    fn test_longer_phrases_outweigh_short_ones() {
        let mut config = MatcherConfig::default();
        config.synonyms.insert(
            "music".to_string(),
            vec!["nursery rhyme collection".to_string()],
        );
        config
            .synonyms
            .insert("alphabet".to_string(), vec!["abc".to_string()]);
        let matcher = CategoryMatcher::new(config);

        let available = vec!["music".to_string(), "alphabet".to_string()];
        let picked = matcher.pick_category("abc nursery rhyme collection", &available);
        assert_eq!(picked, "music");
    }

    #[test]
    fn test_name_substring_fallback() {
        let matcher = CategoryMatcher::new(MatcherConfig {
            synonyms: Default::default(),
            default_category: "educational".to_string(),
        });
        let picked = matcher.pick_category("show me the numbers please", &vocabulary());
        assert_eq!(picked, "numbers");
    }

    #[test]
    fn test_fuzzy_fallback_on_typo() {
        let matcher = CategoryMatcher::default();
        let picked = matcher.pick_category("alphabte", &vocabulary());
        assert_eq!(picked, "alphabet");
    }

    #[test]
    fn test_default_for_nonsense_text() {
        let matcher = CategoryMatcher::default();
        let available = vec!["animals".to_string(), "educational".to_string()];
        let picked = matcher.pick_category("zzz qqq xxyyzz", &available);
        // Either fuzzy-closest or the configured default; must be a member
        assert!(available.contains(&picked));
    }

    #[test]
    fn test_result_always_member_of_vocabulary() {
        let matcher = CategoryMatcher::default();
        let available = vocabulary();
        for text in ["", "dinosaur", "١٢٣", "???", "a very long unrelated sentence"] {
            let picked = matcher.pick_category(text, &available);
            assert!(available.contains(&picked), "{:?} -> {:?}", text, picked);
        }
    }

    #[test]
    fn test_resolve_category_corrects_case() {
        let matcher = CategoryMatcher::default();
        assert_eq!(
            matcher.resolve_category("ANIMALS", &vocabulary()),
            "animals"
        );
        // Unknown requests are never rejected
        let resolved = matcher.resolve_category("animal videos", &vocabulary());
        assert_eq!(resolved, "animals");
    }
}
