// Configuration loader
//
// Layers, lowest precedence first: built-in defaults, optional TOML file,
// SENTIBOT__SECTION__KEY environment variables, flat legacy environment
// variables, then the secrets file.

use std::collections::HashMap;
use std::path::PathBuf;

use config::{Environment as EnvSource, File, FileFormat};

use super::secrets::{SecretStore, API_KEY_SECRET};
use super::settings::Config;
use super::ConfigError;

/// Prefix for structured environment overrides
pub const ENV_PREFIX: &str = "SENTIBOT";

/// Flat environment variables and the config keys they override
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("OPENAI_API_KEY", "openai.api_key"),
    ("OPENAI_MODEL", "openai.model"),
    ("API_TIMEOUT", "openai.timeout_secs"),
    ("MAX_RETRIES", "openai.max_retries"),
    ("ENVIRONMENT", "app.environment"),
    ("DEBUG", "app.debug"),
    ("LOG_LEVEL", "app.log_level"),
    ("EMOTION_CONFIDENCE_THRESHOLD", "model.emotion_confidence_threshold"),
    ("MAX_CONVERSATION_HISTORY", "model.max_conversation_history"),
];

/// Where configuration and secrets are read from
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub config_file: Option<PathBuf>,
    pub secrets_file: Option<PathBuf>,
    /// Fail when the config file is absent (set for an explicit --config)
    pub config_required: bool,
}

impl ConfigPaths {
    /// ~/.sentibot/config.toml and ~/.sentibot/secrets.toml
    pub fn default_locations() -> Self {
        let base = dirs::home_dir().map(|home| home.join(".sentibot"));
        Self {
            config_file: base.as_ref().map(|dir| dir.join("config.toml")),
            secrets_file: base.map(|dir| dir.join("secrets.toml")),
            config_required: false,
        }
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self.config_required = true;
        self
    }

    pub fn with_secrets_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.secrets_file = Some(path.into());
        self
    }
}

/// Load configuration from the process environment (after reading `.env`)
pub fn load_config(paths: &ConfigPaths) -> Result<Config, ConfigError> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }
    let env: HashMap<String, String> = std::env::vars().collect();
    load_config_from(paths, &env)
}

/// Load configuration against an explicit environment map
pub fn load_config_from(
    paths: &ConfigPaths,
    env: &HashMap<String, String>,
) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = &paths.config_file {
        builder = builder.add_source(
            File::from(path.as_path())
                .format(FileFormat::Toml)
                .required(paths.config_required),
        );
    }

    builder = builder.add_source(
        EnvSource::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(Some(structured_env(env))),
    );

    for (var, key) in LEGACY_ENV_KEYS {
        if let Some(value) = env.get(*var) {
            let value = if *var == "ENVIRONMENT" {
                value.trim().to_lowercase()
            } else {
                value.trim().to_string()
            };
            builder = builder.set_override(*key, value)?;
        }
    }

    let mut config: Config = builder.build()?.try_deserialize()?;

    let secrets = match &paths.secrets_file {
        Some(path) => SecretStore::load(path)?,
        None => SecretStore::empty(),
    };
    apply_secrets(&mut config, &secrets);

    config.validate()?;

    tracing::debug!(
        environment = %config.app.environment,
        model = %config.openai.model,
        api_key_configured = config.openai.has_api_key(),
        "Configuration loaded"
    );

    Ok(config)
}

/// A non-blank secret replaces whatever the other layers produced
pub fn apply_secrets(config: &mut Config, secrets: &SecretStore) {
    if let Some(key) = secrets.get(API_KEY_SECRET) {
        config.openai.api_key = Some(key.to_string());
    }
}

/// Only prefixed variables; keeps unrelated process variables out of the tree
fn structured_env(env: &HashMap<String, String>) -> HashMap<String, String> {
    let prefix = format!("{}__", ENV_PREFIX);
    env.iter()
        .filter(|(k, _)| k.starts_with(&prefix))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use std::io::Write;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = load_config_from(&ConfigPaths::default(), &HashMap::new()).unwrap();
        assert_eq!(config.openai.model, "gpt-3.5-turbo");
        assert!(config.openai.api_key().is_none());
        assert_eq!(config.app.environment, Environment::Development);
    }

    #[test]
    fn test_missing_optional_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let paths = ConfigPaths {
            config_file: Some(dir.path().join("absent.toml")),
            secrets_file: Some(dir.path().join("absent-secrets.toml")),
            config_required: false,
        };
        assert!(load_config_from(&paths, &HashMap::new()).is_ok());
    }

    #[test]
    fn test_missing_required_file_fails() {
        let dir = TempDir::new().unwrap();
        let paths = ConfigPaths::default().with_config_file(dir.path().join("absent.toml"));
        assert!(matches!(
            load_config_from(&paths, &HashMap::new()),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_layer_precedence() {
        let dir = TempDir::new().unwrap();
        let file = write_file(
            &dir,
            "config.toml",
            "[openai]\nmodel = \"from-file\"\nmax_tokens = 64\n\n[app]\nlog_level = \"warn\"\n",
        );
        let paths = ConfigPaths::default().with_config_file(file);
        let vars = env(&[
            ("SENTIBOT__OPENAI__MODEL", "from-structured-env"),
            ("OPENAI_MODEL", "from-legacy-env"),
        ]);

        let config = load_config_from(&paths, &vars).unwrap();
        assert_eq!(config.openai.model, "from-legacy-env");
        assert_eq!(config.openai.max_tokens, 64);
        assert_eq!(config.app.log_level, "warn");
    }

    #[test]
    fn test_structured_env_beats_file() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "config.toml", "[openai]\ntimeout_secs = 5\n");
        let paths = ConfigPaths::default().with_config_file(file);
        let vars = env(&[("SENTIBOT__OPENAI__TIMEOUT_SECS", "12")]);

        let config = load_config_from(&paths, &vars).unwrap();
        assert_eq!(config.openai.timeout_secs, 12);
    }

    #[test]
    fn test_legacy_numeric_and_bool_overrides() {
        let vars = env(&[
            ("API_TIMEOUT", "45"),
            ("DEBUG", "true"),
            ("ENVIRONMENT", "Staging"),
            ("MAX_CONVERSATION_HISTORY", "10"),
        ]);
        let config = load_config_from(&ConfigPaths::default(), &vars).unwrap();
        assert_eq!(config.openai.timeout_secs, 45);
        assert!(config.app.debug);
        assert_eq!(config.app.environment, Environment::Staging);
        assert_eq!(config.model.max_conversation_history, 10);
    }

    #[test]
    fn test_secret_wins_over_env() {
        let dir = TempDir::new().unwrap();
        let secrets = write_file(&dir, "secrets.toml", "OPENAI_API_KEY = \"sk-from-secrets\"\n");
        let paths = ConfigPaths::default().with_secrets_file(secrets);
        let vars = env(&[("OPENAI_API_KEY", "sk-from-env")]);

        let config = load_config_from(&paths, &vars).unwrap();
        assert_eq!(config.openai.api_key(), Some("sk-from-secrets"));
    }

    #[test]
    fn test_blank_secret_does_not_override() {
        let dir = TempDir::new().unwrap();
        let secrets = write_file(&dir, "secrets.toml", "OPENAI_API_KEY = \"  \"\n");
        let paths = ConfigPaths::default().with_secrets_file(secrets);
        let vars = env(&[("OPENAI_API_KEY", "sk-from-env")]);

        let config = load_config_from(&paths, &vars).unwrap();
        assert_eq!(config.openai.api_key(), Some("sk-from-env"));
    }

    #[test]
    fn test_production_without_key_is_fatal() {
        let vars = env(&[("ENVIRONMENT", "production")]);
        assert!(matches!(
            load_config_from(&ConfigPaths::default(), &vars),
            Err(ConfigError::MissingApiKey(Environment::Production))
        ));
    }

    #[test]
    fn test_unparseable_secrets_file() {
        let dir = TempDir::new().unwrap();
        let secrets = write_file(&dir, "secrets.toml", "OPENAI_API_KEY = \n");
        let paths = ConfigPaths::default().with_secrets_file(secrets);
        assert!(matches!(
            load_config_from(&paths, &HashMap::new()),
            Err(ConfigError::SecretsParse { .. })
        ));
    }
}
