use crate::client_wrapper::{MessageChunk, SendError, TokenUsage};
use futures_util::{Stream, StreamExt};
use lazy_static::lazy_static;
use openai_rust::chat;
use openai_rust2 as openai_rust;
use std::error::Error;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::Mutex;

lazy_static! {
    /// Process-wide HTTP client shared by every provider wrapper so that
    /// connections, DNS lookups, and TLS handshakes are reused across calls.
    static ref SHARED_HTTP_CLIENT: reqwest::Client = reqwest::ClientBuilder::new()
        // Keep idle connections alive for 90 seconds
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        // Allow up to 10 idle connections per host for better throughput
        .pool_max_idle_per_host(10)
        // Enable TCP keepalive to prevent connection drops
        .tcp_keepalive(Some(Duration::from_secs(60)))
        // Set a reasonable timeout for the entire request
        .timeout(Duration::from_secs(300))
        .build()
        .expect("Failed to build HTTP client");
}

/// Borrow the shared, pooled HTTP client used by all provider wrappers.
pub fn get_shared_http_client() -> &'static reqwest::Client {
    &SHARED_HTTP_CLIENT
}

/// Error type for failures surfaced while consuming a chunk stream.
#[derive(Debug)]
pub struct StreamError(pub String);

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for StreamError {}

/// Send a chat request, record its usage, and return the assistant's content.
pub async fn send_and_track(
    api: &openai_rust::Client,
    model: &str,
    temperature: Option<f32>,
    formatted_msgs: Vec<chat::Message>,
    url_path: Option<String>,
    usage_slot: &Mutex<Option<TokenUsage>>,
) -> Result<String, Box<dyn Error>> {
    let mut chat_arguments = chat::ChatArguments::new(model, formatted_msgs);
    chat_arguments.temperature = temperature;

    let response = api.create_chat(chat_arguments, url_path).await;

    match response {
        Ok(response) => {
            let usage = TokenUsage {
                input_tokens: response.usage.prompt_tokens as usize,
                output_tokens: response.usage.completion_tokens as usize,
                total_tokens: response.usage.total_tokens as usize,
            };

            // Store it for get_last_usage()
            *usage_slot.lock().await = Some(usage);

            Ok(response.choices[0].message.content.clone())
        }
        Err(err) => {
            log::error!(
                "caravan::clients::common::send_and_track(...): chat API error: {}",
                err
            );
            Err(err.into())
        }
    }
}

/// Send a streaming chat request and return a stream of message chunks.
/// Note: token usage tracking is not available for streaming responses.
pub async fn send_and_track_stream(
    api: &openai_rust::Client,
    model: &str,
    temperature: Option<f32>,
    formatted_msgs: Vec<chat::Message>,
    url_path: Option<String>,
) -> Result<Pin<Box<dyn Stream<Item = Result<MessageChunk, SendError>>>>, Box<dyn Error>> {
    let mut chat_arguments = chat::ChatArguments::new(model, formatted_msgs);
    chat_arguments.temperature = temperature;

    let chunk_stream = api.create_chat_stream(chat_arguments, url_path).await?;

    // Map the provider chunks to our MessageChunk type
    let message_stream = chunk_stream.map(|chunk_result| match chunk_result {
        Ok(chunk) => {
            let content = chunk
                .choices
                .first()
                .and_then(|choice| choice.delta.content.clone())
                .unwrap_or_default();
            let is_final = chunk
                .choices
                .first()
                .map(|choice| choice.finish_reason.is_some())
                .unwrap_or(false);

            Ok(MessageChunk { content, is_final })
        }
        Err(err) => {
            Err(Box::new(StreamError(format!("Stream chunk error: {}", err))) as SendError)
        }
    });

    Ok(Box::pin(message_stream))
}
