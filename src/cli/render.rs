// Terminal rendering for chat output
//
// Emotion badges are tinted with the category color when color is enabled.

use crossterm::style::{Color, Stylize};

use crate::emotion::{ClassificationResult, EmotionCategory, ScoreBreakdown};

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn color_enabled(&self) -> bool {
        self.color
    }

    /// "😊 Happy" in the category color
    pub fn badge(&self, category: EmotionCategory) -> String {
        let label = category.display_label();
        if !self.color {
            return label;
        }
        let (r, g, b) = category.rgb();
        format!("{}", label.with(Color::Rgb { r, g, b }).bold())
    }

    /// Badge plus confidence as a percentage
    pub fn classification(&self, result: &ClassificationResult) -> String {
        format!(
            "[{} {:.0}%]",
            self.badge(result.category),
            result.confidence * 100.0
        )
    }

    pub fn user_line(&self, text: &str, result: &ClassificationResult) -> String {
        let speaker = self.dim("You:");
        format!("{} {} {}", speaker, text, self.classification(result))
    }

    pub fn bot_line(&self, reply: &str) -> String {
        let speaker = if self.color {
            format!("{}", "Bot:".cyan().bold())
        } else {
            "Bot:".to_string()
        };
        format!("{} {}", speaker, reply)
    }

    /// Per-category raw scores, one line each
    pub fn breakdown(&self, breakdown: &ScoreBreakdown) -> String {
        let mut lines: Vec<String> = breakdown
            .scores
            .iter()
            .map(|(category, score)| format!("  {:<14} {}", category.display_label(), score))
            .collect();
        lines.push(format!("  {:<14} {}", "words", breakdown.word_count));
        lines.join("\n")
    }

    pub fn notice(&self, text: &str) -> String {
        self.dim(text)
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            format!("{}", text.dark_grey())
        } else {
            text.to_string()
        }
    }
}
