use std::path::PathBuf;

use clap::Parser;

use crate::config::SettingsUpdate;
use crate::models::SelectionPolicy;

/// compat-chat: terminal chat client for OpenAI-compatible APIs
#[derive(Parser, Debug, Clone)]
#[command(name = "compat-chat")]
#[command(version)]
#[command(about = "Terminal chat client for OpenAI-compatible APIs", long_about = None)]
pub struct Cli {
    /// Directory holding settings.json, models.json, config.toml and logs/
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config.toml.
    #[arg(long)]
    pub log_level: Option<String>,

    /// What a picker selects when its model disappears (clear, first, middle)
    #[arg(long, value_name = "POLICY")]
    pub selection_policy: Option<SelectionPolicy>,

    /// API key used for this session. Written to settings only on save.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL used for this session. Written to settings only on save.
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Session-only settings overrides
    pub fn settings_overrides(&self) -> SettingsUpdate {
        SettingsUpdate {
            api_key: self.api_key.clone().filter(|k| !k.trim().is_empty()),
            base_url: self.base_url.clone().filter(|u| !u.trim().is_empty()),
            ..SettingsUpdate::default()
        }
    }
}
