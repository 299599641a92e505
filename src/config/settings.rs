// Configuration structs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use super::ConfigError;
use crate::emotion::EmotionCategory;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

/// Completion service settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAISettings {
    /// API key (never serialized back out)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Reserved; the response path makes a single attempt
    pub max_retries: u32,
    /// Remote capability switch
    pub enabled: bool,
}

impl Default for OpenAISettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            base_url: crate::providers::openai::DEFAULT_BASE_URL.to_string(),
            temperature: 0.7,
            max_tokens: 100,
            timeout_secs: 30,
            max_retries: 3,
            enabled: true,
        }
    }
}

impl fmt::Debug for OpenAISettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAISettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl OpenAISettings {
    /// Configured, non-blank API key
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub environment: Environment,
    pub debug: bool,
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            debug: false,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Reserved; reported but not used to gate anything
    pub emotion_confidence_threshold: f64,
    pub max_conversation_history: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            emotion_confidence_threshold: 0.5,
            max_conversation_history: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
    pub max_sessions: usize,
    pub session_timeout_minutes: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8501".to_string(),
            max_sessions: 100,
            session_timeout_minutes: 30,
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openai: OpenAISettings,
    pub app: AppSettings,
    pub model: ModelSettings,
    pub server: ServerSettings,
    /// Per-category fallback reply overrides, keyed by label or id
    pub fallback_replies: BTreeMap<String, String>,
    /// Per-category keyword set replacements, keyed by label or id
    pub keywords: BTreeMap<String, Vec<String>>,
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.app.environment == Environment::Production
    }

    /// Semantic validation; a production deployment without a key is fatal
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_production() && !self.openai.has_api_key() {
            return Err(ConfigError::MissingApiKey(self.app.environment));
        }

        if !(0.0..=2.0).contains(&self.openai.temperature) {
            return Err(ConfigError::Invalid {
                field: "openai.temperature",
                reason: format!("{} is outside 0.0-2.0", self.openai.temperature),
            });
        }
        if self.openai.max_tokens == 0 {
            return Err(ConfigError::Invalid {
                field: "openai.max_tokens",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.openai.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "openai.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.model.emotion_confidence_threshold) {
            return Err(ConfigError::Invalid {
                field: "model.emotion_confidence_threshold",
                reason: format!("{} is outside 0.0-1.0", self.model.emotion_confidence_threshold),
            });
        }
        if self.model.max_conversation_history == 0 {
            return Err(ConfigError::Invalid {
                field: "model.max_conversation_history",
                reason: "must be greater than zero".to_string(),
            });
        }

        self.fallback_overrides()?;
        self.keyword_overrides()?;
        Ok(())
    }

    /// Fallback reply overrides with parsed category keys
    pub fn fallback_overrides(&self) -> Result<Vec<(EmotionCategory, String)>, ConfigError> {
        self.fallback_replies
            .iter()
            .map(|(key, reply)| {
                let category = parse_category_key("fallback_replies", key)?;
                Ok((category, reply.clone()))
            })
            .collect()
    }

    /// Keyword set replacements with parsed category keys
    pub fn keyword_overrides(&self) -> Result<Vec<(EmotionCategory, Vec<String>)>, ConfigError> {
        self.keywords
            .iter()
            .map(|(key, words)| {
                let category = parse_category_key("keywords", key)?;
                Ok((category, words.clone()))
            })
            .collect()
    }
}

fn parse_category_key(field: &'static str, key: &str) -> Result<EmotionCategory, ConfigError> {
    key.parse::<EmotionCategory>()
        .map_err(|reason| ConfigError::Invalid { field, reason })
}
