// Emotion classifier
//
// Scores every category by keyword presence in the lower-cased text and
// picks the best one. Ties go to the lowest category id.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{EmotionCategory, EmotionKeywordTable, NEUTRAL_CONFIDENCE};

/// Outcome of classifying one message
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: EmotionCategory,
    /// 0.0-1.0
    pub confidence: f64,
}

/// Per-category raw scores for one message, in ascending id order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub scores: Vec<(EmotionCategory, usize)>,
    pub word_count: usize,
}

impl ScoreBreakdown {
    pub fn max_score(&self) -> usize {
        self.scores.iter().map(|(_, s)| *s).max().unwrap_or(0)
    }

    pub fn score(&self, category: EmotionCategory) -> usize {
        self.scores
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, s)| *s)
            .unwrap_or(0)
    }
}

/// Keyword-based emotion classifier
#[derive(Debug, Clone)]
pub struct EmotionClassifier {
    table: Arc<EmotionKeywordTable>,
}

impl Default for EmotionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionClassifier {
    /// Classifier over the reference keyword table
    pub fn new() -> Self {
        Self::with_table(EmotionKeywordTable::reference())
    }

    pub fn with_table(table: EmotionKeywordTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &EmotionKeywordTable {
        &self.table
    }

    /// Raw keyword scores for every category
    pub fn score_breakdown(&self, text: &str) -> ScoreBreakdown {
        let text_lower = text.to_lowercase();
        let scores = EmotionCategory::ALL
            .into_iter()
            .map(|category| (category, self.table.score(category, &text_lower)))
            .collect();

        ScoreBreakdown {
            scores,
            word_count: text.split_whitespace().count(),
        }
    }

    /// Classify a message
    ///
    /// Total over all inputs. With no keyword hit the result is Neutral at
    /// a fixed 0.5 confidence; otherwise confidence is hits / word count,
    /// capped at 1.0.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let breakdown = self.score_breakdown(text);
        let max_score = breakdown.max_score();

        if max_score == 0 {
            return ClassificationResult {
                category: EmotionCategory::Neutral,
                confidence: NEUTRAL_CONFIDENCE,
            };
        }

        // Scores are in ascending id order, so the first max wins ties
        let category = breakdown
            .scores
            .iter()
            .find(|(_, score)| *score == max_score)
            .map(|(category, _)| *category)
            .unwrap_or(EmotionCategory::Neutral);

        let confidence = if breakdown.word_count == 0 {
            0.0
        } else {
            (max_score as f64 / breakdown.word_count as f64).min(1.0)
        };

        ClassificationResult {
            category,
            confidence,
        }
    }
}
