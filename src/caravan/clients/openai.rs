//! The `OpenAIClient` struct implements [`ClientWrapper`] for OpenAI's Chat API,
//! capturing both the assistant response and detailed token usage (input vs output)
//! for cost tracking.
//!
//! # Key Features
//!
//! - **send_message(...)**: returns the assistant's [`Message`].
//! - **Automatic Usage Capture**: stores the latest `TokenUsage` internally.
//! - **Inspect Usage**: call `get_last_usage()` after `send_message()` to retrieve actual usage stats.
//! - **Custom base URLs**: any OpenAI-compatible endpoint can be targeted via
//!   [`OpenAIClient::new_with_base_url`].
//!
//! # Example
//!
//! ```rust,no_run
//! use caravan::clients::openai::{Model, OpenAIClient};
//! use caravan::client_wrapper::{ClientWrapper, Message, Role};
//!
//! #[tokio::main]
//! async fn main() {
//!     let secret_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
//!     let client = OpenAIClient::new_with_model_enum(&secret_key, Model::GPT41Nano);
//!
//!     let resp = client.send_message(&[
//!         Message { role: Role::System, content: "You are an assistant.".into() },
//!         Message { role: Role::User, content: "Hello!".into() },
//!     ]).await.unwrap();
//!     println!("Assistant: {}", resp.content);
//!
//!     if let Some(usage) = client.get_last_usage().await {
//!         println!(
//!             "Tokens - input: {}, output: {}, total: {}",
//!             usage.input_tokens, usage.output_tokens, usage.total_tokens
//!         );
//!     }
//! }
//! ```

use std::error::Error;

use async_trait::async_trait;
use openai_rust::chat;
use openai_rust2 as openai_rust;

use crate::caravan::client_wrapper::{ClientWrapper, Message, Role};
use crate::client_wrapper::{MessageChunkStream, TokenUsage};
use crate::clients::common::{get_shared_http_client, send_and_track, send_and_track_stream};
use tokio::sync::Mutex;

/// Official model identifiers supported by OpenAI's Chat Completions API.
#[allow(non_camel_case_types)]
pub enum Model {
    /// `gpt-5` – high reasoning, medium latency, text or multimodal input.
    GPT5,
    /// `gpt-5-mini` – fast variant of GPT-5 with balanced cost and quality.
    GPT5Mini,
    /// `gpt-5-nano` – lowest latency GPT-5 configuration.
    GPT5Nano,
    /// `gpt-4o` – Omni model with text + image inputs.
    GPT4o,
    /// `gpt-4o-mini` – cost effective GPT-4o derivative.
    GPT4oMini,
    /// `o3` – general availability O-series release.
    O3,
    /// `o4-mini` – newest O-series low-latency tier.
    O4Mini,
    /// `gpt-4.1` – general availability GPT-4.1.
    GPT41,
    /// `gpt-4.1-mini` – reduced cost GPT-4.1 tier.
    GPT41Mini,
    /// `gpt-4.1-nano` – ultra low cost GPT-4.1 derivative.
    GPT41Nano,
}

/// Convert a [`Model`] variant into the string identifier expected by the REST API.
pub fn model_to_string(model: Model) -> String {
    match model {
        Model::GPT5 => "gpt-5".to_string(),
        Model::GPT5Mini => "gpt-5-mini".to_string(),
        Model::GPT5Nano => "gpt-5-nano".to_string(),
        Model::GPT4o => "gpt-4o".to_string(),
        Model::GPT4oMini => "gpt-4o-mini".to_string(),
        Model::O3 => "o3".to_string(),
        Model::O4Mini => "o4-mini".to_string(),
        Model::GPT41 => "gpt-4.1".to_string(),
        Model::GPT41Mini => "gpt-4.1-mini".to_string(),
        Model::GPT41Nano => "gpt-4.1-nano".to_string(),
    }
}

/// Client wrapper for OpenAI's Chat Completions API (and compatible endpoints).
///
/// The wrapper maintains the selected model identifier, an optional sampling
/// temperature, and an internal [`TokenUsage`] slot so callers can inspect how
/// many tokens each request consumed. It reuses the shared HTTP client
/// configured in [`crate::clients::common`].
pub struct OpenAIClient {
    /// Underlying SDK client pointing at the REST endpoint.
    client: openai_rust::Client,
    /// Model name that will be injected into each request.
    model: String,
    /// Optional sampling temperature forwarded with each request.
    temperature: Option<f32>,
    /// Storage for the token usage returned by the most recent request.
    token_usage: Mutex<Option<TokenUsage>>,
}

impl OpenAIClient {
    /// Construct a new client using the provided API key and [`Model`] variant.
    pub fn new_with_model_enum(secret_key: &str, model: Model) -> Self {
        Self::new_with_model_string(secret_key, &model_to_string(model))
    }

    /// Construct a new client using the provided API key and explicit model name.
    ///
    /// This is the most general constructor and can be used for unofficial model
    /// identifiers (e.g. OpenAI compatible self-hosted deployments).
    pub fn new_with_model_string(secret_key: &str, model_name: &str) -> Self {
        OpenAIClient {
            client: openai_rust::Client::new_with_client(
                secret_key,
                get_shared_http_client().clone(),
            ),
            model: model_name.to_string(),
            temperature: None,
            token_usage: Mutex::new(None),
        }
    }

    /// Construct a client targeting a custom OpenAI compatible base URL.
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        OpenAIClient {
            client: openai_rust::Client::new_with_client_and_base_url(
                secret_key,
                get_shared_http_client().clone(),
                base_url,
            ),
            model: model_name.to_string(),
            temperature: None,
            token_usage: Mutex::new(None),
        }
    }

    /// Set the sampling temperature forwarded with each request (builder pattern).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// The configured sampling temperature, if any.
    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Convert provider-neutral messages into the format expected by openai_rust.
    fn format_messages(messages: &[Message]) -> Vec<chat::Message> {
        let mut formatted_messages = Vec::with_capacity(messages.len());
        for msg in messages {
            formatted_messages.push(chat::Message {
                role: match msg.role {
                    Role::System => "system".to_owned(),
                    Role::User => "user".to_owned(),
                    Role::Assistant => "assistant".to_owned(),
                },
                content: msg.content.to_string(),
            });
        }
        formatted_messages
    }
}

#[async_trait]
impl ClientWrapper for OpenAIClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn send_message(&self, messages: &[Message]) -> Result<Message, Box<dyn Error>> {
        let formatted_messages = Self::format_messages(messages);
        let url_path_string = "/v1/chat/completions".to_string();

        let result = send_and_track(
            &self.client,
            &self.model,
            self.temperature,
            formatted_messages,
            Some(url_path_string),
            &self.token_usage,
        )
        .await;

        match result {
            Ok(content) => Ok(Message {
                role: Role::Assistant,
                content,
            }),
            Err(err) => {
                if log::log_enabled!(log::Level::Error) {
                    log::error!("OpenAIClient::send_message(...): chat API error: {}", err);
                }
                Err("Error occurred while sending message".into())
            }
        }
    }

    async fn send_message_stream(
        &self,
        messages: &[Message],
    ) -> Result<MessageChunkStream, Box<dyn Error>> {
        let formatted_messages = Self::format_messages(messages);
        let url_path_string = "/v1/chat/completions".to_string();

        send_and_track_stream(
            &self.client,
            &self.model,
            self.temperature,
            formatted_messages,
            Some(url_path_string),
        )
        .await
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        Some(&self.token_usage)
    }
}
