// Configuration module
// Public interface for configuration loading

mod error;
mod loader;
mod secrets;
mod settings;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from, ConfigPaths, ENV_PREFIX};
pub use secrets::{SecretStore, API_KEY_SECRET};
pub use settings::{AppSettings, Config, Environment, ModelSettings, OpenAISettings, ServerSettings};
