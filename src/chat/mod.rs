// Chat module
// Conversation sessions and the per-turn engine

mod conversation;
mod engine;

pub use conversation::{
    ConversationSession, ConversationTurn, EmotionCount, SessionSnapshot, Speaker,
};
pub use engine::{ChatEngine, TurnOutcome};
