// Prompt construction for remote replies

use crate::emotion::EmotionCategory;
use crate::providers::ChatMessage;

/// System instruction embedding the detected emotion
pub fn system_prompt(category: EmotionCategory) -> String {
    format!(
        "You are an empathetic AI chatbot. The user seems {}. Respond with genuine empathy and support in 1-2 sentences. Be warm and understanding.",
        category.label_lower()
    )
}

/// The two-message conversation sent for one turn; user text goes verbatim
pub fn build_messages(user_text: &str, category: EmotionCategory) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt(category)),
        ChatMessage::user(user_text),
    ]
}
