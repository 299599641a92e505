// Chat engine
//
// One turn: classify, record the user turn, produce a reply, record the bot
// turn. Shared read-only across sessions.

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::ConversationSession;
use crate::config::Config;
use crate::emotion::{ClassificationResult, EmotionClassifier, EmotionKeywordTable};
use crate::metrics::ChatMetrics;
use crate::providers::{create_client, CompletionClient};
use crate::responder::{FallbackTable, GenerationSettings, Reply, ResponseGenerator};

/// Result of one chat turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub classification: ClassificationResult,
    pub reply: Reply,
}

#[derive(Debug, Clone)]
pub struct ChatEngine {
    classifier: EmotionClassifier,
    generator: ResponseGenerator,
    metrics: ChatMetrics,
    max_history: usize,
}

impl ChatEngine {
    pub fn new(
        classifier: EmotionClassifier,
        generator: ResponseGenerator,
        metrics: ChatMetrics,
        max_history: usize,
    ) -> Self {
        Self {
            classifier,
            generator,
            metrics,
            max_history,
        }
    }

    /// Build the engine, choosing the completion client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_client(config, create_client(&config.openai))
    }

    /// Build the engine around an explicit completion client
    pub fn with_client(config: &Config, client: Arc<dyn CompletionClient>) -> Result<Self> {
        let mut table = EmotionKeywordTable::reference();
        for (category, words) in config.keyword_overrides()? {
            table = table.with_keywords(category, words);
        }

        let mut fallbacks = FallbackTable::reference();
        for (category, reply) in config.fallback_overrides()? {
            fallbacks = fallbacks.with_reply(category, reply);
        }

        let generator = ResponseGenerator::new(client, GenerationSettings::from(&config.openai))
            .with_fallbacks(fallbacks);

        Ok(Self::new(
            EmotionClassifier::with_table(table),
            generator,
            ChatMetrics::new()?,
            config.model.max_conversation_history,
        ))
    }

    pub fn classifier(&self) -> &EmotionClassifier {
        &self.classifier
    }

    pub fn generator(&self) -> &ResponseGenerator {
        &self.generator
    }

    pub fn metrics(&self) -> &ChatMetrics {
        &self.metrics
    }

    /// Fresh session sized to the configured history length
    pub fn new_session(&self) -> ConversationSession {
        ConversationSession::new(self.max_history)
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        self.classifier.classify(text)
    }

    pub async fn handle_turn(&self, session: &mut ConversationSession, text: &str) -> TurnOutcome {
        self.handle_turn_with_cancel(session, text, &CancellationToken::new())
            .await
    }

    /// Run one turn; cancelling the token resolves the reply via fallback
    pub async fn handle_turn_with_cancel(
        &self,
        session: &mut ConversationSession,
        text: &str,
        cancel: &CancellationToken,
    ) -> TurnOutcome {
        let classification = self.classifier.classify(text);
        session.push_user_turn(text, classification);
        self.metrics.record_turn(classification.category);

        let reply = self
            .generator
            .generate_response_with_cancel(text, classification.category, cancel)
            .await;
        session.push_bot_turn(reply.text.clone());

        self.metrics.record_reply(reply.source);
        if let Some(diagnostic) = &reply.diagnostic {
            self.metrics.record_remote_failure(diagnostic.kind);
        }

        tracing::debug!(
            session_id = %session.id(),
            emotion = classification.category.label(),
            confidence = classification.confidence,
            source = reply.source.as_str(),
            "Turn handled"
        );

        TurnOutcome {
            classification,
            reply,
        }
    }
}
