// Client factory
//
// Builds the completion client from configuration. Anything short of a
// usable credential yields the null client.

use std::sync::Arc;

use super::{CompletionClient, NullCompletionClient, OpenAIClient};
use crate::config::OpenAISettings;

/// Create the completion client for the given settings
pub fn create_client(settings: &OpenAISettings) -> Arc<dyn CompletionClient> {
    if !settings.enabled {
        tracing::info!("Remote completions disabled, using fallback replies only");
        return Arc::new(NullCompletionClient::new("remote completions disabled"));
    }

    let Some(api_key) = settings.api_key() else {
        tracing::info!("No OpenAI API key configured, using fallback replies only");
        return Arc::new(NullCompletionClient::new("no API key configured"));
    };

    match OpenAIClient::with_options(api_key, &settings.base_url, settings.timeout()) {
        Ok(client) => {
            tracing::info!(model = %settings.model, base_url = %client.base_url(), "Using OpenAI completions");
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build OpenAI client, using fallback replies only");
            Arc::new(NullCompletionClient::new(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_key_gives_null_client() {
        let settings = OpenAISettings::default();
        let client = create_client(&settings);
        assert_eq!(client.name(), "null");
        assert!(!client.is_available());
    }

    #[test]
    fn test_blank_key_gives_null_client() {
        let settings = OpenAISettings {
            api_key: Some("   ".to_string()),
            ..OpenAISettings::default()
        };
        assert!(!create_client(&settings).is_available());
    }

    #[test]
    fn test_disabled_gives_null_client() {
        let settings = OpenAISettings {
            api_key: Some("sk-test".to_string()),
            enabled: false,
            ..OpenAISettings::default()
        };
        assert_eq!(create_client(&settings).name(), "null");
    }

    #[test]
    fn test_key_gives_openai_client() {
        let settings = OpenAISettings {
            api_key: Some("sk-test".to_string()),
            ..OpenAISettings::default()
        };
        let client = create_client(&settings);
        assert_eq!(client.name(), "openai");
        assert!(client.is_available());
    }
}
