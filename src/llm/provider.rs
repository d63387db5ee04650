use async_trait::async_trait;

use super::types::{ChatRequest, Endpoint, FetchError};

/// Remote calls the client makes. Implemented by the HTTP client and by
/// test doubles.
#[async_trait]
pub trait Provider: Send + Sync {
    /// List the model identifiers offered at `endpoint`, deduplicated
    async fn list_models(&self, endpoint: &Endpoint) -> Result<Vec<String>, FetchError>;

    /// Run one chat completion and return the display text of the reply
    async fn complete(&self, endpoint: &Endpoint, request: &ChatRequest) -> Result<String, FetchError>;
}
