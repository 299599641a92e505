// Conversation session state
//
// Append-only turn log for one user, bounded by the configured history
// length. Reset clears the log but keeps the session identity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use uuid::Uuid;

use crate::emotion::{ClassificationResult, EmotionCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

/// One entry in the conversation log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
    /// Detected emotion (user turns only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<EmotionCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>, classification: ClassificationResult) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            emotion: Some(classification.category),
            confidence: Some(classification.confidence),
            timestamp: Utc::now(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
            emotion: None,
            confidence: None,
            timestamp: Utc::now(),
        }
    }
}

/// Count of user turns per emotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmotionCount {
    pub emotion: EmotionCategory,
    pub count: usize,
}

/// Per-user conversation state
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: String,
    turns: VecDeque<ConversationTurn>,
    emotion_history: VecDeque<EmotionCategory>,
    emotion_counts: BTreeMap<EmotionCategory, usize>,
    max_history: usize,
    /// User turns over the whole session lifetime, survives reset
    total_user_turns: u64,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(max_history: usize) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), max_history)
    }

    pub fn with_id(id: impl Into<String>, max_history: usize) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            turns: VecDeque::new(),
            emotion_history: VecDeque::new(),
            emotion_counts: BTreeMap::new(),
            max_history: max_history.max(1),
            total_user_turns: 0,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Record a classified user message
    pub fn push_user_turn(&mut self, text: impl Into<String>, classification: ClassificationResult) {
        let category = classification.category;
        self.push(ConversationTurn::user(text, classification));

        self.emotion_history.push_back(category);
        if self.emotion_history.len() > self.max_history {
            self.emotion_history.pop_front();
        }
        *self.emotion_counts.entry(category).or_insert(0) += 1;
        self.total_user_turns += 1;
    }

    pub fn push_bot_turn(&mut self, text: impl Into<String>) {
        self.push(ConversationTurn::bot(text));
    }

    fn push(&mut self, turn: ConversationTurn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.max_history {
            self.turns.pop_front();
        }
        self.touch();
    }

    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    /// Retained turns, user and bot
    pub fn message_count(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Emotions of recent user turns, oldest first
    pub fn emotion_history(&self) -> impl Iterator<Item = EmotionCategory> + '_ {
        self.emotion_history.iter().copied()
    }

    /// Emotions seen since the last reset, most frequent first (ties by id)
    pub fn emotion_breakdown(&self) -> Vec<EmotionCount> {
        let mut counts: Vec<EmotionCount> = self
            .emotion_counts
            .iter()
            .map(|(emotion, count)| EmotionCount {
                emotion: *emotion,
                count: *count,
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.emotion.id().cmp(&b.emotion.id())));
        counts
    }

    /// Most frequent emotion since the last reset
    pub fn dominant_emotion(&self) -> Option<EmotionCategory> {
        self.emotion_breakdown().first().map(|c| c.emotion)
    }

    pub fn total_user_turns(&self) -> u64 {
        self.total_user_turns
    }

    /// Start a new chat in place
    pub fn reset(&mut self) {
        self.turns.clear();
        self.emotion_history.clear();
        self.emotion_counts.clear();
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn is_expired(&self, timeout_minutes: u64) -> bool {
        let elapsed = Utc::now().signed_duration_since(self.last_activity);
        elapsed.num_minutes() >= timeout_minutes as i64
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            message_count: self.message_count(),
            total_user_turns: self.total_user_turns,
            turns: self.turns.iter().cloned().collect(),
            emotion_breakdown: self.emotion_breakdown(),
            created_at: self.created_at,
            last_activity: self.last_activity,
        }
    }
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub message_count: usize,
    pub total_user_turns: u64,
    pub turns: Vec<ConversationTurn>,
    pub emotion_breakdown: Vec<EmotionCount>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(category: EmotionCategory) -> ClassificationResult {
        ClassificationResult {
            category,
            confidence: 0.5,
        }
    }

    #[test]
    fn test_turns_are_appended_in_order() {
        let mut session = ConversationSession::new(10);
        session.push_user_turn("hello", result(EmotionCategory::Neutral));
        session.push_bot_turn("hi there");

        let turns: Vec<_> = session.turns().collect();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker, Speaker::User);
        assert_eq!(turns[0].emotion, Some(EmotionCategory::Neutral));
        assert_eq!(turns[1].speaker, Speaker::Bot);
        assert_eq!(turns[1].emotion, None);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut session = ConversationSession::new(3);
        for i in 0..5 {
            session.push_user_turn(format!("msg {}", i), result(EmotionCategory::Happy));
        }
        assert_eq!(session.message_count(), 3);
        assert_eq!(session.turns().next().map(|t| t.text.as_str()), Some("msg 2"));
        assert_eq!(session.emotion_history().count(), 3);
        assert_eq!(session.total_user_turns(), 5);
    }

    #[test]
    fn test_breakdown_sorted_by_count_then_id() {
        let mut session = ConversationSession::new(50);
        session.push_user_turn("a", result(EmotionCategory::Surprised));
        session.push_user_turn("b", result(EmotionCategory::Sad));
        session.push_user_turn("c", result(EmotionCategory::Surprised));
        session.push_user_turn("d", result(EmotionCategory::Happy));

        let breakdown = session.emotion_breakdown();
        let order: Vec<_> = breakdown.iter().map(|c| (c.emotion, c.count)).collect();
        assert_eq!(
            order,
            vec![
                (EmotionCategory::Surprised, 2),
                (EmotionCategory::Happy, 1),
                (EmotionCategory::Sad, 1),
            ]
        );
        assert_eq!(session.dominant_emotion(), Some(EmotionCategory::Surprised));
    }

    #[test]
    fn test_reset_keeps_identity() {
        let mut session = ConversationSession::new(10);
        let id = session.id().to_string();
        session.push_user_turn("hello", result(EmotionCategory::Happy));
        session.push_bot_turn("hi");

        session.reset();
        assert!(session.is_empty());
        assert_eq!(session.emotion_history().count(), 0);
        assert!(session.emotion_breakdown().is_empty());
        assert_eq!(session.id(), id);
        assert_eq!(session.total_user_turns(), 1);
    }

    #[test]
    fn test_expiry() {
        let session = ConversationSession::new(10);
        assert!(!session.is_expired(30));
        assert!(session.is_expired(0));
    }
}
