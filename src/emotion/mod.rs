// Emotion detection
//
// Keyword-based emotion classification. The classifier matches keywords
// directly against the lower-cased message; the normalization helper in
// `preprocess` is diagnostic only and never feeds the scorer.

mod category;
mod classifier;
mod keywords;
pub mod preprocess;

pub use category::EmotionCategory;
pub use classifier::{ClassificationResult, EmotionClassifier, ScoreBreakdown};
pub use keywords::EmotionKeywordTable;
pub use preprocess::normalize_text;

/// Confidence reported when no keyword matched
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;
