//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default completion model to use
fn default_model() -> String {
    "gpt-4o-2024-08-06".to_string()
}

/// Default sampling temperature for the extraction call
fn default_temperature() -> f32 {
    0.3
}

/// Default max output tokens for the completion endpoint
fn default_max_tokens() -> u32 {
    4096
}

/// Default directory for saved reports
fn default_output_dir() -> String {
    "output".to_string()
}

/// Default number of channel messages fetched per digest
fn default_slack_message_limit() -> u16 {
    50
}

/// Default bind address for the web front end
fn default_web_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

/// Configuration for the incident-copilot application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// OpenAI API key (`INCIDENT_COPILOT_OPENAI_API_KEY`).
    pub openai_api_key: String,
    /// Completion model to use (`INCIDENT_COPILOT_MODEL`).
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature for the extraction call (`INCIDENT_COPILOT_TEMPERATURE`).
    /// Capped at 0.3: extraction wants literal, near-deterministic output,
    /// not creative paraphrase.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Max output tokens per completion (`INCIDENT_COPILOT_MAX_TOKENS`).
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Optional custom system instruction to override the built-in
    /// extraction contract (`INCIDENT_COPILOT_SYSTEM_PROMPT`).
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Directory where generated reports are saved (`INCIDENT_COPILOT_OUTPUT_DIR`).
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Slack bot token for fetching and posting messages
    /// (`INCIDENT_COPILOT_SLACK_BOT_TOKEN`). Optional: only the Slack
    /// surfaces need it.
    #[serde(default)]
    pub slack_bot_token: Option<String>,
    /// Slack app token for the socket-mode bot
    /// (`INCIDENT_COPILOT_SLACK_APP_TOKEN`). Optional: only `bot` mode
    /// needs it.
    #[serde(default)]
    pub slack_app_token: Option<String>,
    /// Number of channel messages fetched per digest
    /// (`INCIDENT_COPILOT_SLACK_MESSAGE_LIMIT`).
    #[serde(default = "default_slack_message_limit")]
    pub slack_message_limit: u16,
    /// Bind address for the web front end (`INCIDENT_COPILOT_WEB_BIND_ADDR`).
    #[serde(default = "default_web_bind_addr")]
    pub web_bind_addr: String,
}

impl ConfigInner {
    /// True when a Slack bot token is configured.
    pub fn has_slack(&self) -> bool {
        self.slack_bot_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    fn validate(&self) -> Res<()> {
        if !(0.0..=0.3).contains(&self.temperature) {
            return Err(anyhow::anyhow!("Temperature must be between 0 and 0.3 for literal extraction."));
        }

        if self.max_tokens < 1 || self.max_tokens > 128000 {
            return Err(anyhow::anyhow!("Max tokens must be between 1 and 128000."));
        }

        Ok(())
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("INCIDENT_COPILOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new("copilot.toml").exists() {
            cfg = cfg.add_source(config::File::with_name("copilot"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply_when_only_api_key_is_given() {
        let inner: ConfigInner = serde_json::from_value(json!({ "openai_api_key": "test_key" })).unwrap();

        assert_eq!(inner.model, "gpt-4o-2024-08-06");
        assert_eq!(inner.temperature, 0.3);
        assert_eq!(inner.max_tokens, 4096);
        assert_eq!(inner.output_dir, "output");
        assert_eq!(inner.slack_message_limit, 50);
        assert_eq!(inner.web_bind_addr, "127.0.0.1:8080");
        assert!(inner.system_prompt.is_none());
        assert!(!inner.has_slack());
    }

    #[test]
    fn high_temperature_is_rejected() {
        let inner = ConfigInner {
            openai_api_key: "test_key".to_string(),
            temperature: 0.9,
            max_tokens: 4096,
            ..Default::default()
        };

        assert!(inner.validate().is_err());
    }

    #[test]
    fn extraction_range_temperature_is_accepted() {
        let inner = ConfigInner {
            openai_api_key: "test_key".to_string(),
            temperature: 0.0,
            max_tokens: 4096,
            ..Default::default()
        };

        assert!(inner.validate().is_ok());
    }
}
