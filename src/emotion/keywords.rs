// Emotion keyword table
//
// Category -> lower-cased trigger words. Built once at startup and shared
// read-only between turns.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use super::EmotionCategory;

static REFERENCE_TABLE: Lazy<EmotionKeywordTable> = Lazy::new(|| {
    EmotionKeywordTable::empty()
        .with_keywords(
            EmotionCategory::Happy,
            ["happy", "great", "wonderful", "excellent", "awesome", "good", "love", "joy", "excited"],
        )
        .with_keywords(
            EmotionCategory::Sad,
            ["sad", "depressed", "upset", "unhappy", "terrible", "bad", "hate", "miserable", "lonely"],
        )
        .with_keywords(
            EmotionCategory::Angry,
            ["angry", "furious", "mad", "irritated", "annoyed", "rage", "hostile"],
        )
        .with_keywords(
            EmotionCategory::Neutral,
            ["okay", "fine", "normal", "usual", "regular", "neutral", "alright"],
        )
        .with_keywords(
            EmotionCategory::Frustrated,
            ["frustrated", "annoyed", "tired", "exhausted", "fed up", "irritated"],
        )
        .with_keywords(
            EmotionCategory::Surprised,
            ["surprised", "shocked", "amazed", "wow", "unexpected", "wonder"],
        )
});

/// Keyword sets per emotion category
///
/// Categories without an entry behave as if they had an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmotionKeywordTable {
    entries: BTreeMap<EmotionCategory, Vec<String>>,
}

impl EmotionKeywordTable {
    /// Table with no keywords at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in reference table
    pub fn reference() -> Self {
        REFERENCE_TABLE.clone()
    }

    /// Replace the keyword set of one category
    ///
    /// Keywords are trimmed, lower-cased and de-duplicated; blank entries are dropped.
    pub fn with_keywords<I, S>(mut self, category: EmotionCategory, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !set.contains(&keyword) {
                set.push(keyword);
            }
        }
        self.entries.insert(category, set);
        self
    }

    /// Keywords registered for a category (empty if none)
    pub fn keywords(&self, category: EmotionCategory) -> &[String] {
        self.entries
            .get(&category)
            .map(|k| k.as_slice())
            .unwrap_or(&[])
    }

    /// Number of distinct keywords of `category` present in `text_lower`
    ///
    /// Presence only: a keyword occurring several times still counts once.
    pub fn score(&self, category: EmotionCategory, text_lower: &str) -> usize {
        self.keywords(category)
            .iter()
            .filter(|keyword| text_lower.contains(keyword.as_str()))
            .count()
    }

    /// Keywords of `category` present in `text_lower`
    pub fn matches<'a>(&'a self, category: EmotionCategory, text_lower: &str) -> Vec<&'a str> {
        self.keywords(category)
            .iter()
            .filter(|keyword| text_lower.contains(keyword.as_str()))
            .map(|keyword| keyword.as_str())
            .collect()
    }

    pub fn total_keywords(&self) -> usize {
        self.entries.values().map(|k| k.len()).sum()
    }
}
