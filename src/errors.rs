// User-friendly error messages
//
// Converts startup failures into actionable messages for the terminal.

use std::fmt;

use crate::config::{ConfigError, Environment};

/// Format a missing API key error with helpful suggestions
pub fn missing_api_key_error(environment: Environment) -> String {
    format!(
        "OPENAI_API_KEY is required in {} mode\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Export the key:\n\
           \x1b[36mexport OPENAI_API_KEY=\"sk-...\"\x1b[0m\n\n\
        2. Add it to the secrets file:\n\
           \x1b[36mecho 'OPENAI_API_KEY = \"sk-...\"' >> ~/.sentibot/secrets.toml\x1b[0m\n\n\
        3. Run outside production to use built-in replies only:\n\
           \x1b[36mexport ENVIRONMENT=development\x1b[0m",
        environment
    )
}

/// Format a config parse error with helpful suggestions
pub fn config_parse_error(error: &str) -> String {
    format!(
        "Failed to load configuration\n\n\
        \x1b[1;33mError:\x1b[0m {}\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Check config file syntax:\n\
           \x1b[36mcat ~/.sentibot/config.toml\x1b[0m\n\n\
        2. Check SENTIBOT__* environment variables:\n\
           \x1b[36menv | grep SENTIBOT__\x1b[0m\n\n\
        3. Common mistakes:\n\
           • Missing quotes around strings\n\
           • Numbers given where text is expected (or the reverse)\n\
           • Unknown emotion names under [keywords] or [fallback_replies]",
        error
    )
}

/// Format an invalid setting error
pub fn invalid_setting_error(field: &str, reason: &str) -> String {
    format!(
        "Invalid configuration value for {}\n\n\
        \x1b[1;33mError:\x1b[0m {}\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        • Fix the value in ~/.sentibot/config.toml or the matching environment variable",
        field, reason
    )
}

/// Format a bind failure with helpful suggestions
pub fn bind_failed_error(address: &str, error: impl fmt::Display) -> String {
    format!(
        "Could not start server on {}\n\n\
        \x1b[1;33mError:\x1b[0m {}\n\n\
        \x1b[1;33mPossible causes:\x1b[0m\n\
        • Another process is using the port\n\
        • Address is not valid for this host\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        \x1b[36msentibot serve --bind 127.0.0.1:8502\x1b[0m",
        address, error
    )
}

/// Friendly rendering of any configuration failure
pub fn describe_config_error(error: &ConfigError) -> String {
    match error {
        ConfigError::MissingApiKey(environment) => missing_api_key_error(*environment),
        ConfigError::Invalid { field, reason } => invalid_setting_error(field, reason),
        other => config_parse_error(&other.to_string()),
    }
}
