use serde::{Deserialize, Serialize};

use crate::config::{normalize_base_url, Settings};

/// Where requests go and how they authenticate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Always ends with `/`
    pub base_url: String,
    pub api_key: String,
}

impl Endpoint {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            api_key: api_key.trim().to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.base_url(), settings.api_key())
    }

    pub fn models_url(&self) -> String {
        format!("{}v1/models", self.base_url)
    }

    pub fn chat_url(&self) -> String {
        format!("{}v1/chat/completions", self.base_url)
    }

    /// Bearer header value, only when a key is configured
    pub fn bearer(&self) -> Option<String> {
        if self.api_key.is_empty() {
            None
        } else {
            Some(format!("Bearer {}", self.api_key))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One chat completion call: a single user turn
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub prompt: String,
    /// Prepended to the user content when non-empty
    pub system_prompt: Option<String>,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn user_content(&self) -> String {
        match self.system_prompt.as_deref().map(str::trim) {
            Some(system) if !system.is_empty() => format!("{}\n\n{}", system, self.prompt),
            _ => self.prompt.clone(),
        }
    }

    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": Role::User, "content": self.user_content() }
            ],
            "temperature": self.temperature,
        })
    }
}

/// Failure of a remote call
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("HTTP error {status}")]
    Http {
        status: u16,
        /// Raw response body
        body: String,
    },

    #[error("Parse error: {message}")]
    Parse { message: String },
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Status and pretty-printed JSON body for HTTP failures, the error
    /// itself otherwise
    pub fn detail(&self) -> String {
        match self {
            FetchError::Http { status, body } => {
                match serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| serde_json::to_string_pretty(&v).ok())
                {
                    Some(pretty) => format!("HTTP error {}:\n{}", status, pretty),
                    None if body.trim().is_empty() => format!("HTTP error {}", status),
                    None => format!("HTTP error {}: {}", status, body.trim()),
                }
            }
            other => other.to_string(),
        }
    }

    /// Text shown inline in the conversation
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Http { .. } => self.detail(),
            other => format!("Error: {}", other),
        }
    }
}
