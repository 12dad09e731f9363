pub mod cli;

use crate::utils::error::{BotError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Bot configuration, read from a JSON file with kebab-case keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Channel to sync streams to.
    pub channel: u64,

    /// Endpoint where we get current streamers.
    #[serde(rename = "api-path")]
    pub api_path: String,

    /// Key used to connect to the streams API.
    #[serde(rename = "api-key")]
    pub api_key: String,

    /// Token used to log into Discord.
    #[serde(rename = "discord-token")]
    pub discord_token: String,

    /// Seconds between sync cycles.
    #[serde(rename = "interval-seconds")]
    pub interval_seconds: Option<u64>,

    /// Override of the Discord REST base URL. Only tests set this.
    #[serde(rename = "discord-api-base")]
    pub discord_api_base: Option<String>,
}

impl BotConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BotError::IoError)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);
        serde_json::from_str(&processed_content).map_err(|e| BotError::ConfigValidationError {
            field: "json_parsing".to_string(),
            message: format!("JSON parsing error: {}", e),
        })
    }

    pub fn interval_seconds(&self) -> u64 {
        self.interval_seconds.unwrap_or(DEFAULT_INTERVAL_SECONDS)
    }

    pub fn discord_api_base(&self) -> &str {
        self.discord_api_base
            .as_deref()
            .unwrap_or(DEFAULT_DISCORD_API_BASE)
    }
}

/// Replaces `${VAR_NAME}` references with environment variable values.
/// Unresolvable references are left as-is so validation surfaces them.
fn substitute_env_vars(content: &str) -> String {
    use regex::Regex;
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .to_string()
}

impl Validate for BotConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api-path", &self.api_path)?;
        validation::validate_non_empty_string("api-key", &self.api_key)?;
        validation::validate_non_empty_string("discord-token", &self.discord_token)?;

        if self.channel == 0 {
            return Err(BotError::InvalidConfigValueError {
                field: "channel".to_string(),
                value: self.channel.to_string(),
                reason: "Channel id must be a valid Discord snowflake".to_string(),
            });
        }

        validation::validate_positive_number(
            "interval-seconds",
            self.interval_seconds(),
            1,
        )?;

        if let Some(base) = &self.discord_api_base {
            validation::validate_url("discord-api-base", base)?;
        }

        Ok(())
    }
}
