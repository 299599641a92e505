// Runtime secret store
//
// Flat TOML file of secrets provided by the hosting environment. A value
// found here wins over every other configuration source.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::ConfigError;

/// Secret name holding the completion API key
pub const API_KEY_SECRET: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default)]
pub struct SecretStore {
    values: BTreeMap<String, String>,
}

impl SecretStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load secrets from a TOML file; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::empty());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::SecretsIo {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&contents).map_err(|source| ConfigError::SecretsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse secrets from TOML text; non-string values are ignored
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        let table: toml::Table = toml::from_str(contents)?;
        let values = table
            .into_iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
            .collect();
        Ok(Self { values })
    }

    /// Non-blank secret value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_get() {
        let store = SecretStore::parse("OPENAI_API_KEY = \"sk-secret\"\nOTHER = 3\n").unwrap();
        assert_eq!(store.get(API_KEY_SECRET), Some("sk-secret"));
        assert_eq!(store.get("OTHER"), None);
    }

    #[test]
    fn test_blank_secret_is_absent() {
        let store = SecretStore::empty().with_secret(API_KEY_SECRET, "  ");
        assert_eq!(store.get(API_KEY_SECRET), None);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = SecretStore::load(Path::new("/nonexistent/sentibot/secrets.toml")).unwrap();
        assert_eq!(store.get(API_KEY_SECRET), None);
    }

    #[test]
    fn test_parse_error() {
        assert!(SecretStore::parse("OPENAI_API_KEY = ").is_err());
    }
}
