//! Configuration management

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::application::container::PluginFilter;
use crate::application::errors::ConfigError;

/// Runtime configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub commands: CommandsConfig,
    pub extensions: ExtensionsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    /// Text command prefixes, a single string or a list
    #[serde(rename = "prefix", deserialize_with = "one_or_many")]
    pub prefixes: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub owners: Vec<String>,
    /// Drop messages written by other bots
    pub ignore_bots: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CommandsConfig {
    /// Reconcile the application command tree on startup
    pub auto_register: bool,
    /// Register into this guild instead of globally
    pub guild_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExtensionsConfig {
    /// Activate globally scoped extensions right after loading
    pub auto_activate: bool,
    /// Guild id -> extensions disabled in that guild
    pub disabled: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "carik-runtime".to_string(),
            prefixes: vec!["!".to_string()],
            owners: Vec::new(),
            ignore_bots: true,
        }
    }
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            auto_activate: true,
            disabled: HashMap::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefixes.is_empty() {
            return Err(ConfigError::MissingField("bot.prefix".to_string()));
        }
        if self.bot.prefixes.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::InvalidValue("bot.prefix entries must not be blank".to_string()));
        }
        Ok(())
    }

    /// Check if a user ID is a configured owner
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.bot.owners.iter().any(|o| o == user_id)
    }

    pub fn is_extension_enabled(&self, extension: &str, guild_id: &str) -> bool {
        self.extensions
            .disabled
            .get(guild_id)
            .map_or(true, |disabled| !disabled.iter().any(|d| d == extension))
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Apply `BOT_PREFIX` / `BOT_OWNERS` overrides (comma separated)
    pub fn apply_env(&mut self) {
        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            let prefixes = split_list(&prefix);
            if !prefixes.is_empty() {
                self.bot.prefixes = prefixes;
            }
        }

        if let Ok(owners) = std::env::var("BOT_OWNERS") {
            self.bot.owners = split_list(&owners);
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl PluginFilter for Config {
    async fn is_enabled(&self, extension: &str, guild_id: &str) -> bool {
        self.is_extension_enabled(extension, guild_id)
    }
}
