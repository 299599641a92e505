// Slash command handling

use crate::chat::ConversationSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    /// Start a new chat in the current session
    New,
    Stats,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "/help" => Some(Command::Help),
            "/quit" | "/exit" => Some(Command::Quit),
            "/new" | "/clear" | "/reset" => Some(Command::New),
            "/stats" => Some(Command::Stats),
            _ => None,
        }
    }
}

pub fn format_help() -> String {
    r#"Available commands:
  /help             - Show this help message
  /new              - Start a new chat (clears history)
  /stats            - Show message and emotion statistics
  /quit, /exit      - Exit

Anything else is sent as a message. Press Ctrl-C while a reply is pending
to cancel the remote call and use the built-in reply instead."#
        .to_string()
}

/// Session statistics: message counts and emotion breakdown
pub fn format_stats(session: &ConversationSession) -> String {
    let breakdown = session.emotion_breakdown();
    let detected: usize = breakdown.iter().map(|c| c.count).sum();

    let mut output = String::new();
    output.push_str("Session statistics:\n");
    output.push_str(&format!("  Total messages:    {}\n", session.message_count()));
    output.push_str(&format!("  Emotions detected: {}\n", detected));
    output.push_str(&format!("  Lifetime turns:    {}\n", session.total_user_turns()));

    if breakdown.is_empty() {
        output.push_str("\nNo emotions detected yet.");
        return output;
    }

    output.push_str("\nEmotion breakdown:\n");
    for entry in &breakdown {
        output.push_str(&format!(
            "  {:<14} {}\n",
            entry.emotion.display_label(),
            entry.count
        ));
    }
    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{ClassificationResult, EmotionCategory};

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("  /exit "), Some(Command::Quit));
        assert_eq!(Command::parse("/quit"), Some(Command::Quit));
        assert_eq!(Command::parse("/new"), Some(Command::New));
        assert_eq!(Command::parse("/stats"), Some(Command::Stats));
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse("hello /stats"), None);
    }

    #[test]
    fn test_stats_for_empty_session() {
        let session = ConversationSession::new(10);
        let stats = format_stats(&session);
        assert!(stats.contains("Total messages:    0"));
        assert!(stats.contains("No emotions detected yet."));
    }

    #[test]
    fn test_stats_breakdown() {
        let mut session = ConversationSession::new(10);
        let happy = ClassificationResult {
            category: EmotionCategory::Happy,
            confidence: 0.4,
        };
        session.push_user_turn("yay", happy);
        session.push_bot_turn("great");
        session.push_user_turn("woo", happy);

        let stats = format_stats(&session);
        assert!(stats.contains("Total messages:    3"));
        assert!(stats.contains("Emotions detected: 2"));
        assert!(stats.contains("😊 Happy"));
    }
}
