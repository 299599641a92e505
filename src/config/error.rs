// Configuration errors
//
// All of these are fatal at startup.

use std::path::PathBuf;
use thiserror::Error;

use super::Environment;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to read secrets file {}: {source}", .path.display())]
    SecretsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse secrets file {}: {source}", .path.display())]
    SecretsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("OPENAI_API_KEY is required in {0} mode")]
    MissingApiKey(Environment),

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
