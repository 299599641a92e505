// Fallback reply table
//
// One fixed reply per category. Used whenever the remote completion is
// skipped or fails.

use std::collections::BTreeMap;

use crate::emotion::EmotionCategory;

const REFERENCE_REPLIES: [(EmotionCategory, &str); 6] = [
    (
        EmotionCategory::Happy,
        "That's wonderful! I'm really glad you're feeling good. Your positive energy is contagious! 😊",
    ),
    (
        EmotionCategory::Sad,
        "I understand you're going through a tough time. It's completely okay to feel this way. I'm here to listen. 💙",
    ),
    (
        EmotionCategory::Angry,
        "I can sense your frustration. Take a deep breath. Sometimes we just need to let it out. How can I help? 🤝",
    ),
    (
        EmotionCategory::Neutral,
        "Thanks for sharing. I appreciate you opening up. Tell me more about what's on your mind. 👂",
    ),
    (
        EmotionCategory::Frustrated,
        "It sounds like you've had a challenging experience. That's frustrating. Would you like to talk about it? 💪",
    ),
    (
        EmotionCategory::Surprised,
        "That's really interesting! I'd love to hear more about what surprised you. 🌟",
    ),
];

/// Category to canned reply mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTable {
    replies: BTreeMap<EmotionCategory, String>,
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self::reference()
    }
}

impl FallbackTable {
    /// Table with no entries; every category gets the generic reply
    pub fn empty() -> Self {
        Self {
            replies: BTreeMap::new(),
        }
    }

    /// The six built-in replies
    pub fn reference() -> Self {
        Self {
            replies: REFERENCE_REPLIES
                .iter()
                .map(|(category, reply)| (*category, reply.to_string()))
                .collect(),
        }
    }

    pub fn with_reply(mut self, category: EmotionCategory, reply: impl Into<String>) -> Self {
        self.replies.insert(category, reply.into());
        self
    }

    pub fn without(mut self, category: EmotionCategory) -> Self {
        self.replies.remove(&category);
        self
    }

    pub fn get(&self, category: EmotionCategory) -> Option<&str> {
        self.replies.get(&category).map(String::as_str)
    }

    /// Mapped reply, or the generic template for unmapped categories
    pub fn reply_for(&self, category: EmotionCategory) -> String {
        match self.get(category) {
            Some(reply) => reply.to_string(),
            None => generic_reply(category),
        }
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }
}

/// Category-agnostic reply that still names the emotion
pub fn generic_reply(category: EmotionCategory) -> String {
    format!(
        "I understand you're feeling {}. I'm here to support you. 💙",
        category.label_lower()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_covers_every_category() {
        let table = FallbackTable::reference();
        assert_eq!(table.len(), 6);
        for category in EmotionCategory::ALL {
            assert!(table.get(category).is_some(), "missing {:?}", category);
        }
    }

    #[test]
    fn test_reference_reply_text() {
        let table = FallbackTable::reference();
        assert_eq!(
            table.reply_for(EmotionCategory::Surprised),
            "That's really interesting! I'd love to hear more about what surprised you. 🌟"
        );
    }

    #[test]
    fn test_unmapped_category_uses_generic() {
        let table = FallbackTable::reference().without(EmotionCategory::Frustrated);
        assert_eq!(
            table.reply_for(EmotionCategory::Frustrated),
            "I understand you're feeling frustrated. I'm here to support you. 💙"
        );
    }

    #[test]
    fn test_override() {
        let table = FallbackTable::reference().with_reply(EmotionCategory::Happy, "Yay!");
        assert_eq!(table.reply_for(EmotionCategory::Happy), "Yay!");
    }
}
