pub mod client;
pub mod manager;
pub mod provider;
pub mod types;

pub use client::{extract_reply, parse_model_list, OpenAiCompatClient};
pub use manager::{LLMEvent, LLMManager};
pub use provider::Provider;
pub use types::*;
