use std::sync::Arc;

use tokio::sync::mpsc;

use super::provider::Provider;
use super::types::{ChatRequest, Endpoint, FetchError};

/// Event from the background request tasks
#[derive(Debug, Clone)]
pub enum LLMEvent {
    /// Result of a model list fetch started with `generation`
    ModelsFetched {
        generation: u64,
        result: Result<Vec<String>, FetchError>,
    },
    ChatReply {
        result: Result<String, FetchError>,
    },
    /// The in-flight chat request was cancelled
    ChatCancelled,
}

/// Runs remote calls off the UI loop and reports back over a channel
pub struct LLMManager {
    provider: Arc<dyn Provider>,
    event_tx: mpsc::UnboundedSender<LLMEvent>,
    event_rx: Option<mpsc::UnboundedReceiver<LLMEvent>>,
    cancel_tx: Option<mpsc::Sender<()>>,
}

impl LLMManager {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            provider,
            event_tx,
            event_rx: Some(event_rx),
            cancel_tx: None,
        }
    }

    pub fn take_event_rx(&mut self) -> Option<mpsc::UnboundedReceiver<LLMEvent>> {
        self.event_rx.take()
    }

    /// Start a model list fetch tagged with `generation`
    pub fn fetch_models(&self, generation: u64, endpoint: Endpoint) {
        let provider = Arc::clone(&self.provider);
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            let result = provider.list_models(&endpoint).await;
            if let Err(e) = &result {
                tracing::warn!(generation, "Model fetch failed: {}", e);
            }
            let _ = event_tx.send(LLMEvent::ModelsFetched { generation, result });
        });
    }

    pub fn send_chat(&mut self, endpoint: Endpoint, request: ChatRequest) {
        let provider = Arc::clone(&self.provider);
        let event_tx = self.event_tx.clone();
        let (cancel_tx, mut cancel_rx) = mpsc::channel::<()>(1);
        self.cancel_tx = Some(cancel_tx);

        tokio::spawn(async move {
            tokio::select! {
                result = provider.complete(&endpoint, &request) => {
                    if let Err(e) = &result {
                        tracing::warn!(model = %request.model, "Chat request failed: {}", e);
                    }
                    let _ = event_tx.send(LLMEvent::ChatReply { result });
                }
                _ = cancel_rx.recv() => {
                    tracing::info!("Chat request cancelled");
                    let _ = event_tx.send(LLMEvent::ChatCancelled);
                }
            }
        });
    }

    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.try_send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    struct FakeProvider {
        models: Vec<String>,
        reply_delay: Duration,
    }

    #[async_trait]
    impl Provider for FakeProvider {
        async fn list_models(&self, _endpoint: &Endpoint) -> Result<Vec<String>, FetchError> {
            Ok(self.models.clone())
        }

        async fn complete(&self, _endpoint: &Endpoint, request: &ChatRequest) -> Result<String, FetchError> {
            tokio::time::sleep(self.reply_delay).await;
            if request.prompt == "fail" {
                return Err(FetchError::Http {
                    status: 500,
                    body: String::new(),
                });
            }
            Ok(format!("echo: {}", request.prompt))
        }
    }

    fn manager(reply_delay: Duration) -> LLMManager {
        LLMManager::new(Arc::new(FakeProvider {
            models: vec!["a".to_string(), "b".to_string()],
            reply_delay,
        }))
    }

    fn endpoint() -> Endpoint {
        Endpoint::new("http://localhost:11434", "")
    }

    fn request(prompt: &str) -> ChatRequest {
        ChatRequest {
            model: "a".to_string(),
            prompt: prompt.to_string(),
            system_prompt: None,
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn test_fetch_reports_generation() {
        let mut manager = manager(Duration::ZERO);
        let mut rx = manager.take_event_rx().unwrap();
        assert!(manager.take_event_rx().is_none());

        manager.fetch_models(7, endpoint());

        match rx.recv().await.unwrap() {
            LLMEvent::ModelsFetched { generation, result } => {
                assert_eq!(generation, 7);
                assert_eq!(result.unwrap(), vec!["a", "b"]);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chat_reply_and_error() {
        let mut manager = manager(Duration::ZERO);
        let mut rx = manager.take_event_rx().unwrap();

        manager.send_chat(endpoint(), request("hi"));
        match rx.recv().await.unwrap() {
            LLMEvent::ChatReply { result } => assert_eq!(result.unwrap(), "echo: hi"),
            other => panic!("unexpected event: {:?}", other),
        }

        manager.send_chat(endpoint(), request("fail"));
        match rx.recv().await.unwrap() {
            LLMEvent::ChatReply { result } => assert_eq!(result.unwrap_err().status(), Some(500)),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_in_flight_chat() {
        let mut manager = manager(Duration::from_secs(30));
        let mut rx = manager.take_event_rx().unwrap();

        manager.send_chat(endpoint(), request("slow"));
        manager.cancel();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, LLMEvent::ChatCancelled));
    }
}
