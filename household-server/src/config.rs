//! Server configuration from `HOUSEHOLD_SERVER_*` environment variables.

use std::collections::HashSet;

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

fn default_bind() -> String {
    "127.0.0.1:4100".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// `HOUSEHOLD_SERVER_BIND`
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Accepted session tokens, comma separated in `HOUSEHOLD_SERVER_TOKENS`.
    #[serde(default)]
    pub tokens: HashSet<String>,

    /// Language notifications are rendered in.
    #[serde(default = "default_language")]
    pub language: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_source(Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix("HOUSEHOLD_SERVER")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("tokens")
    }

    fn from_source(env: Environment) -> Result<Self> {
        let config: ServerConfig = Config::builder()
            .add_source(env)
            .build()?
            .try_deserialize()?;

        if config.tokens.is_empty() {
            tracing::warn!("no session tokens configured, every request will be rejected");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_without_environment() {
        let config =
            ServerConfig::from_source(ServerConfig::environment().source(Some(HashMap::new())))
                .unwrap();

        assert_eq!(config.bind, "127.0.0.1:4100");
        assert!(config.tokens.is_empty());
        assert_eq!(config.language, "en");
    }

    #[test]
    fn tokens_are_comma_separated() {
        let env = ServerConfig::environment().source(Some(HashMap::from([
            ("HOUSEHOLD_SERVER_TOKENS".to_string(), "alpha,beta".to_string()),
            ("HOUSEHOLD_SERVER_BIND".to_string(), "0.0.0.0:8080".to_string()),
        ])));
        let config = ServerConfig::from_source(env).unwrap();

        assert_eq!(config.bind, "0.0.0.0:8080");
        assert!(config.tokens.contains("alpha"));
        assert!(config.tokens.contains("beta"));
    }
}
