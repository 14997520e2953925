//! Client configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::dispatcher::Member;
use crate::error::{HouseholdError, HouseholdResult};

static DEFAULT_SERVER_URL: &str = "http://127.0.0.1:4100";
static DEFAULT_LANGUAGE: &str = "en";

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Client configuration at ~/.config/household/config.toml
///
/// Every key can be overridden from the environment with a `HOUSEHOLD_`
/// prefix, e.g. `HOUSEHOLD_FAMILY_ID`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// `en` or `cz`; picks holidays and notification language.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_url: default_server_url(),
            token: None,
            family_id: None,
            user_id: None,
            user_name: None,
            language: default_language(),
        }
    }
}

impl ClientConfig {
    pub fn config_path() -> HouseholdResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| HouseholdError::Config("Could not determine config directory".into()))?
            .join("household");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default path and the process environment, writing a
    /// commented default file first if none exists.
    pub fn load() -> HouseholdResult<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            Self::create_default_config(&path)?;
        }
        Self::load_from(&path, Environment::with_prefix("HOUSEHOLD"))
    }

    pub fn load_from(path: &Path, env: Environment) -> HouseholdResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(env)
            .build()
            .map_err(|e| HouseholdError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| HouseholdError::Config(e.to_string()))
    }

    pub fn save_to(&self, path: &Path) -> HouseholdResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| HouseholdError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                HouseholdError::Config(format!("Could not create config directory: {e}"))
            })?;
        }
        std::fs::write(path, content)
            .map_err(|e| HouseholdError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Save to ~/.config/household/config.toml
    pub fn save(&self) -> HouseholdResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> HouseholdResult<()> {
        let contents = format!(
            "\
# household configuration

# Server to talk to:
# server_url = \"{DEFAULT_SERVER_URL}\"

# Session token sent as a bearer token:
# token = \"...\"

# Who you are:
# family_id = \"...\"
# user_id = \"...\"
# user_name = \"...\"

# Language for holidays and notifications (en, cz):
# language = \"{DEFAULT_LANGUAGE}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                HouseholdError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| HouseholdError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// The member identity needed by list stores.
    pub fn member(&self) -> HouseholdResult<Member> {
        let required = |value: &Option<String>, key: &str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| HouseholdError::Config(format!("'{key}' is not set")))
        };

        let user_id = required(&self.user_id, "user_id")?;
        Ok(Member {
            family_id: required(&self.family_id, "family_id")?,
            user_name: self.user_name.clone().unwrap_or_else(|| user_id.clone()),
            user_id,
        })
    }
}
