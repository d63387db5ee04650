//! User settings persisted as a flat JSON record
//!
//! Stored in `~/.config/compat-chat/settings.json`. Fields that were never set
//! stay absent on disk; defaults are applied when reading.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/";

/// Accent colour applied to the active tab and the send hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccentColor {
    #[default]
    Blue,
    Red,
    Black,
    White,
    Green,
}

impl AccentColor {
    pub const ALL: &'static [AccentColor] = &[
        AccentColor::Blue,
        AccentColor::Red,
        AccentColor::Black,
        AccentColor::White,
        AccentColor::Green,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccentColor::Blue => "blue",
            AccentColor::Red => "red",
            AccentColor::Black => "black",
            AccentColor::White => "white",
            AccentColor::Green => "green",
        }
    }

    /// Parse a stored value; unknown names yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(value.trim()))
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        if idx == 0 {
            Self::ALL[Self::ALL.len() - 1]
        } else {
            Self::ALL[idx - 1]
        }
    }
}

impl fmt::Display for AccentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable settings snapshot
///
/// Mutation goes through [`Settings::update`], which returns a new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    system_prompt: Option<String>,
    /// Fields this client does not interpret, written back untouched
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// A set of field changes; `None` leaves a field as it was
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub accent_color: Option<AccentColor>,
    pub system_prompt: Option<String>,
}

impl SettingsUpdate {
    pub fn model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Default::default()
        }
    }

    pub fn accent(color: AccentColor) -> Self {
        Self {
            accent_color: Some(color),
            ..Default::default()
        }
    }
}

impl Settings {
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or("")
    }

    pub fn base_url(&self) -> &str {
        match self.base_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => DEFAULT_BASE_URL,
        }
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or("")
    }

    pub fn accent_color(&self) -> AccentColor {
        self.accent_color
            .as_deref()
            .and_then(AccentColor::parse)
            .unwrap_or_default()
    }

    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or("")
    }

    /// Value of a field this client does not know about
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Apply an update and return the resulting snapshot
    pub fn update(&self, update: SettingsUpdate) -> Settings {
        let mut next = self.clone();
        if let Some(key) = update.api_key {
            next.api_key = Some(key.trim().to_string());
        }
        if let Some(url) = update.base_url {
            next.base_url = Some(normalize_base_url(&url));
        }
        if let Some(model) = update.model {
            let model = model.trim();
            if !model.is_empty() {
                next.model = Some(model.to_string());
            }
        }
        if let Some(color) = update.accent_color {
            next.accent_color = Some(color.as_str().to_string());
        }
        if let Some(prompt) = update.system_prompt {
            next.system_prompt = Some(prompt.trim().to_string());
        }
        next
    }
}

/// Trim and guarantee a trailing `/`; an empty value maps to the public endpoint
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }
    format!("{}/", trimmed.trim_end_matches('/'))
}

/// Reads and writes [`Settings`] at a fixed path
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings; any failure yields an empty record
    pub fn load(&self) -> Settings {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings file at {}, using defaults", self.path.display());
                return Settings::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", self.path.display(), e);
                return Settings::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", self.path.display(), e);
                Settings::default()
            }
        }
    }

    /// Persist settings, logging instead of failing
    pub fn save(&self, settings: &Settings) {
        if let Err(e) = self.try_save(settings) {
            tracing::warn!("Settings not saved: {}", e);
        }
    }

    pub fn try_save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AppError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(settings).map_err(|e| AppError::Serialize {
            what: "settings",
            message: e.to_string(),
        })?;

        std::fs::write(&self.path, content).map_err(|source| AppError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
