mod cache;
mod settings;
mod theme;

pub use cache::{CacheLoad, ModelCache};
pub use settings::{
    normalize_base_url, AccentColor, Settings, SettingsStore, SettingsUpdate, DEFAULT_BASE_URL,
};
pub use theme::Theme;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::BaseDirs;

use crate::error::{AppError, Result};
use crate::models::SelectionPolicy;

const CONFIG_DIR: &str = "compat-chat";
const MAIN_CONFIG_FILE: &str = "config.toml";
const SETTINGS_FILE: &str = "settings.json";
const MODEL_CACHE_FILE: &str = "models.json";
const LOG_DIR: &str = "logs";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub http: HttpConfig,
    pub models: ModelsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub tick_interval_ms: u64,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 250,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub list_timeout_secs: u64,
    pub chat_timeout_secs: u64,
    pub temperature: f32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            list_timeout_secs: 20,
            chat_timeout_secs: 120,
            temperature: 0.7,
        }
    }
}

impl HttpConfig {
    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_secs)
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_secs(self.chat_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub selection_policy: SelectionPolicy,
    pub auto_fetch_on_start: bool,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            selection_policy: SelectionPolicy::Clear,
            auto_fetch_on_start: true,
        }
    }
}

/// Locates the per-user config directory and the files inside it
pub struct ConfigManager {
    config_dir: PathBuf,
    app_config: AppConfig,
}

impl ConfigManager {
    pub fn new(override_dir: Option<PathBuf>) -> Result<Self> {
        let config_dir = match override_dir {
            Some(dir) => dir,
            None => Self::get_config_dir()?,
        };
        let app_config = Self::load_app_config(&config_dir);

        Ok(Self {
            config_dir,
            app_config,
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn app_config(&self) -> &AppConfig {
        &self.app_config
    }

    pub fn app_config_mut(&mut self) -> &mut AppConfig {
        &mut self.app_config
    }

    pub fn settings_store(&self) -> SettingsStore {
        SettingsStore::new(self.config_dir.join(SETTINGS_FILE))
    }

    pub fn model_cache(&self) -> ModelCache {
        ModelCache::new(self.config_dir.join(MODEL_CACHE_FILE))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.config_dir.join(LOG_DIR)
    }

    fn get_config_dir() -> Result<PathBuf> {
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join(CONFIG_DIR))
            .ok_or_else(|| AppError::Config("Could not determine config directory".to_string()))
    }

    fn load_app_config(config_dir: &Path) -> AppConfig {
        let path = config_dir.join(MAIN_CONFIG_FILE);
        Self::load_toml_file(&path).unwrap_or_default()
    }

    fn load_toml_file<T: for<'de> Deserialize<'de>>(path: &Path) -> Option<T> {
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }
}
