//! HTTP client for OpenAI-compatible `/v1/models` and `/v1/chat/completions`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use super::provider::Provider;
use super::types::{ChatRequest, Endpoint, FetchError};
use crate::config::HttpConfig;
use crate::models::dedupe;

pub struct OpenAiCompatClient {
    http_client: Client,
    list_timeout: Duration,
    chat_timeout: Duration,
}

impl OpenAiCompatClient {
    pub fn new(config: &HttpConfig) -> Self {
        Self {
            http_client: Client::new(),
            list_timeout: config.list_timeout(),
            chat_timeout: config.chat_timeout(),
        }
    }

    pub fn models_request(&self, endpoint: &Endpoint) -> RequestBuilder {
        let mut request = self
            .http_client
            .get(endpoint.models_url())
            .timeout(self.list_timeout);
        if let Some(bearer) = endpoint.bearer() {
            request = request.header(AUTHORIZATION, bearer);
        }
        request
    }

    pub fn chat_request(&self, endpoint: &Endpoint, chat: &ChatRequest) -> RequestBuilder {
        let mut request = self
            .http_client
            .post(endpoint.chat_url())
            .timeout(self.chat_timeout)
            .header(CONTENT_TYPE, "application/json")
            .json(&chat.body());
        if let Some(bearer) = endpoint.bearer() {
            request = request.header(AUTHORIZATION, bearer);
        }
        request
    }

    async fn send_json(request: RequestBuilder) -> Result<Value, FetchError> {
        let response = request.send().await.map_err(|e| FetchError::Network {
            message: if e.is_timeout() {
                "request timed out".to_string()
            } else {
                e.to_string()
            },
        })?;
        Self::read_json(response).await
    }

    async fn read_json(response: Response) -> Result<Value, FetchError> {
        let status = response.status();
        let text = response.text().await.map_err(|e| FetchError::Network {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| FetchError::Parse {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Provider for OpenAiCompatClient {
    async fn list_models(&self, endpoint: &Endpoint) -> Result<Vec<String>, FetchError> {
        tracing::info!("Fetching models from {}", endpoint.models_url());
        let data = Self::send_json(self.models_request(endpoint)).await?;
        Ok(parse_model_list(&data))
    }

    async fn complete(&self, endpoint: &Endpoint, request: &ChatRequest) -> Result<String, FetchError> {
        tracing::info!(model = %request.model, "Sending chat completion to {}", endpoint.chat_url());
        let data = Self::send_json(self.chat_request(endpoint, request)).await?;
        Ok(extract_reply(&data))
    }
}

/// Identifier of one list item: a bare string, or an object's `id`, else its `name`
fn model_id(item: &Value) -> Option<&str> {
    match item {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) => ["id", "name"]
            .iter()
            .filter_map(|key| obj.get(*key).and_then(Value::as_str))
            .find(|s| !s.is_empty()),
        _ => None,
    }
}

/// Accepts `{ "data": [...] }` or a bare array; anything else yields no models
pub fn parse_model_list(data: &Value) -> Vec<String> {
    let items = match data {
        Value::Object(obj) => obj.get("data").and_then(Value::as_array),
        Value::Array(items) => Some(items),
        _ => None,
    };

    let ids = items
        .into_iter()
        .flatten()
        .filter_map(model_id)
        .filter(|id| !id.is_empty());
    dedupe(ids)
}

/// Reply text from a completion body; unknown shapes come back as pretty JSON
pub fn extract_reply(data: &Value) -> String {
    let first = data
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first());

    if let Some(first) = first {
        if let Some(content) = first.pointer("/message/content").and_then(Value::as_str) {
            if !content.is_empty() {
                return content.to_string();
            }
        }
        if let Some(text) = first.get("text").and_then(Value::as_str) {
            return text.to_string();
        }
    }

    serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
}
