// Metrics module
// Prometheus counters for chat turns and reply sources

use anyhow::{Context, Result};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::emotion::EmotionCategory;
use crate::responder::ReplySource;

/// Per-process chat counters on a private registry
#[derive(Clone)]
pub struct ChatMetrics {
    registry: Registry,
    turns: IntCounterVec,
    replies: IntCounterVec,
    remote_failures: IntCounterVec,
}

impl std::fmt::Debug for ChatMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatMetrics").finish_non_exhaustive()
    }
}

impl ChatMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let turns = IntCounterVec::new(
            Opts::new("sentibot_turns_total", "User turns by detected emotion"),
            &["emotion"],
        )?;
        let replies = IntCounterVec::new(
            Opts::new("sentibot_replies_total", "Bot replies by source"),
            &["source"],
        )?;
        let remote_failures = IntCounterVec::new(
            Opts::new(
                "sentibot_remote_failures_total",
                "Failed completion calls by error kind",
            ),
            &["kind"],
        )?;

        registry.register(Box::new(turns.clone()))?;
        registry.register(Box::new(replies.clone()))?;
        registry.register(Box::new(remote_failures.clone()))?;

        Ok(Self {
            registry,
            turns,
            replies,
            remote_failures,
        })
    }

    pub fn record_turn(&self, emotion: EmotionCategory) {
        let label = emotion.label_lower();
        self.turns.with_label_values(&[label.as_str()]).inc();
    }

    pub fn record_reply(&self, source: ReplySource) {
        self.replies.with_label_values(&[source.as_str()]).inc();
    }

    pub fn record_remote_failure(&self, kind: &str) {
        self.remote_failures.with_label_values(&[kind]).inc();
    }

    pub fn turn_count(&self, emotion: EmotionCategory) -> u64 {
        let label = emotion.label_lower();
        self.turns.with_label_values(&[label.as_str()]).get()
    }

    pub fn reply_count(&self, source: ReplySource) -> u64 {
        self.replies.with_label_values(&[source.as_str()]).get()
    }

    pub fn remote_failure_count(&self, kind: &str) -> u64 {
        self.remote_failures.with_label_values(&[kind]).get()
    }

    /// Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output was not UTF-8")
    }
}
