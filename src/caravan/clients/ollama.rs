//! Ollama client wrapper built on the OpenAI-compatible transport.
//!
//! Use this module when you want to talk to a locally running
//! [Ollama](https://ollama.com) server through the same [`ClientWrapper`]
//! interface used by the rest of the crate. Ollama exposes an
//! OpenAI-compatible surface under `/v1`, so the wrapper delegates HTTP
//! concerns to the shared OpenAI implementation and swapping from a hosted
//! provider to a local model only requires a different constructor.
//!
//! # Example
//!
//! ```rust,no_run
//! use caravan::client_wrapper::{ClientWrapper, Message, Role};
//! use caravan::clients::ollama::OllamaClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OllamaClient::new("qwen3:8b");
//!     let reply = client
//!         .send_message(&[Message {
//!             role: Role::User,
//!             content: "List three Tunisian cities.".into(),
//!         }])
//!         .await?;
//!     println!("{}", reply.content);
//!     Ok(())
//! }
//! ```

use crate::client_wrapper::{MessageChunkStream, TokenUsage};
use crate::clients::openai::OpenAIClient;
use crate::{ClientWrapper, Message};
use async_trait::async_trait;
use std::error::Error;
use tokio::sync::Mutex;

/// Default host of a locally running Ollama server.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Client wrapper for a local Ollama server routed through its OpenAI
/// compatible surface.
pub struct OllamaClient {
    /// Delegated client that handles the HTTP interactions.
    delegate_client: OpenAIClient,
    /// Exposed model name.
    model: String,
}

impl OllamaClient {
    /// Create a client for the given model against [`DEFAULT_OLLAMA_HOST`].
    pub fn new(model_name: &str) -> Self {
        Self::new_with_host(model_name, DEFAULT_OLLAMA_HOST)
    }

    /// Create a client for the given model against an explicit host
    /// (e.g. `http://localhost:11434` or a remote Ollama deployment).
    pub fn new_with_host(model_name: &str, host: &str) -> Self {
        let base_url = format!("{}/v1", host.trim_end_matches('/'));
        OllamaClient {
            // Ollama ignores the API key but the transport requires one.
            delegate_client: OpenAIClient::new_with_base_url("ollama", model_name, &base_url),
            model: model_name.to_string(),
        }
    }

    /// Set the sampling temperature forwarded with each request (builder pattern).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.delegate_client = self.delegate_client.with_temperature(temperature);
        self
    }
}

#[async_trait]
impl ClientWrapper for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn send_message(&self, messages: &[Message]) -> Result<Message, Box<dyn Error>> {
        self.delegate_client.send_message(messages).await
    }

    async fn send_message_stream(
        &self,
        messages: &[Message],
    ) -> Result<MessageChunkStream, Box<dyn Error>> {
        self.delegate_client.send_message_stream(messages).await
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        self.delegate_client.usage_slot()
    }
}
