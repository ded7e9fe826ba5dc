//! The `llm_session` module manages a conversational session with an LLM,
//! handling not just message history and context pruning, but also
//! real token accounting (input vs. output) for cost estimates.
//!
//! **Key features:**
//! - **Automatic context trimming**: never exceed your `max_tokens` window.
//! - **Token tracking**: accumulates `input_tokens` & `output_tokens` per call.
//! - **Easy inspection**: call `session.token_usage()` to get a `TokenUsage` struct.
//! - **Streaming**: `send_message_stream()` yields chunks as they arrive.
//!
//! ## Quickstart
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use caravan::client_wrapper::Role;
//! use caravan::clients::openai::{Model, OpenAIClient};
//! use caravan::LLMSession;
//!
//! # async {
//! // 1) Build the client & session
//! let client = OpenAIClient::new_with_model_enum("YOUR_OPENAI_KEY", Model::GPT41Nano);
//! let mut session = LLMSession::new(
//!     Arc::new(client),
//!     "You are a seasoned travel planner.".into(),
//!     8_192, // max context window
//! );
//!
//! // 2) Send a message
//! let reply = session
//!     .send_message(Role::User, "Where should I go in March?".into())
//!     .await
//!     .unwrap();
//! println!("Assistant: {}", reply.content);
//!
//! // 3) Inspect token usage so far
//! let usage = session.token_usage();
//! println!(
//!     "Input: {} tokens, Output: {} tokens, Total: {} tokens",
//!     usage.input_tokens, usage.output_tokens, usage.total_tokens
//! );
//! # };
//! ```
//!
//! The session automatically prunes oldest messages when cumulative tokens
//! exceed the configured window.

use crate::caravan::client_wrapper::{ClientWrapper, Message, Role};
use crate::client_wrapper;
use crate::client_wrapper::MessageChunkStream;
use std::sync::Arc;

/// A conversation session with an LLM, including:
///
/// - `client`: your `ClientWrapper` (e.g. `OpenAIClient`, `OllamaClient`).
/// - `system_prompt`: the context-steering system message.
/// - `conversation_history`: all user & assistant messages (excluding system prompt).
/// - `max_tokens`: your configured context window size.
pub struct LLMSession {
    client: Arc<dyn ClientWrapper>,
    system_prompt: Message,
    conversation_history: Vec<Message>,
    max_tokens: usize,
    total_input_tokens: usize,
    total_output_tokens: usize,
    total_token_count: usize,
}

impl LLMSession {
    /// Creates a new `LLMSession` with the given client and system prompt.
    /// Initializes the conversation history and sets the maximum token limit.
    pub fn new(client: Arc<dyn ClientWrapper>, system_prompt: String, max_tokens: usize) -> Self {
        let system_prompt_message = Message {
            role: Role::System,
            content: system_prompt,
        };
        LLMSession {
            client,
            system_prompt: system_prompt_message,
            conversation_history: Vec::new(),
            max_tokens,
            total_input_tokens: 0,
            total_output_tokens: 0,
            total_token_count: 0,
        }
    }

    /// Sends a message, receives the assistant's reply, and automatically:
    /// 1. Adds the message to history
    /// 2. Calls into your client's `send_message(...)` with the system prompt prepended
    /// 3. Pulls real token usage via `client.get_last_usage()`
    /// 4. Updates cumulative token counters
    /// 5. Prunes oldest messages if the window is exceeded
    ///
    /// Returns the assistant's `Message`; call `session.token_usage()`
    /// to see your cumulative usage.
    pub async fn send_message(
        &mut self,
        role: Role,
        content: String,
    ) -> Result<Message, Box<dyn std::error::Error>> {
        let message = Message { role, content };

        // Add the new message to the conversation history
        self.conversation_history.push(message);

        let request = self.messages_with_system_prompt();

        // Send the messages to the LLM
        let response = self.client.send_message(&request).await?;

        self.record_usage_and_trim().await;

        // Add the LLM's response to the conversation history
        self.conversation_history.push(response.clone());

        Ok(response)
    }

    /// Streaming variant of [`send_message`](LLMSession::send_message).
    ///
    /// The provided message is added to the history and the request is issued
    /// through the client's streaming path. Token usage is not available for
    /// streamed responses, and the assistant's reply is *not* recorded
    /// automatically — accumulate the chunks and call
    /// [`inject_message`](LLMSession::inject_message) with the full response
    /// to keep the conversation context intact.
    pub async fn send_message_stream(
        &mut self,
        role: Role,
        content: String,
    ) -> Result<MessageChunkStream, Box<dyn std::error::Error>> {
        let message = Message { role, content };
        self.conversation_history.push(message);

        let request = self.messages_with_system_prompt();
        self.client.send_message_stream(&request).await
    }

    /// Inject a message into the history without calling the LLM.
    ///
    /// Used to record a streamed assistant reply, or by orchestration layers
    /// to feed other agents' responses into this session's context.
    pub fn inject_message(&mut self, role: Role, content: String) {
        self.conversation_history.push(Message { role, content });
    }

    /// Sets a new system prompt for the session.
    pub fn set_system_prompt(&mut self, prompt: String) {
        self.system_prompt = Message {
            role: Role::System,
            content: prompt,
        };
    }

    /// The current system prompt text.
    pub fn system_prompt_text(&self) -> &str {
        &self.system_prompt.content
    }

    /// Snapshot of the conversation history (system prompt excluded).
    pub fn get_conversation_history(&self) -> &[Message] {
        &self.conversation_history
    }

    /// Returns the current cumulative token usage statistics.
    pub fn token_usage(&self) -> client_wrapper::TokenUsage {
        client_wrapper::TokenUsage {
            input_tokens: self.total_input_tokens,
            output_tokens: self.total_output_tokens,
            total_tokens: self.total_token_count,
        }
    }

    /// The configured context window size.
    pub fn get_max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Borrow the underlying client.
    pub fn client(&self) -> &Arc<dyn ClientWrapper> {
        &self.client
    }

    /// The model identifier of the underlying client.
    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Build the request message array: system prompt first, then history.
    fn messages_with_system_prompt(&self) -> Vec<Message> {
        let mut request = Vec::with_capacity(self.conversation_history.len() + 1);
        request.push(self.system_prompt.clone());
        request.extend(self.conversation_history.iter().cloned());
        request
    }

    /// Pull real usage from the client and prune oldest history entries until
    /// the cumulative count fits the window again.
    async fn record_usage_and_trim(&mut self) {
        if let Some(usage) = self.client.get_last_usage().await {
            self.total_input_tokens = usage.input_tokens;
            self.total_output_tokens = usage.output_tokens;
            self.total_token_count = usage.total_tokens;

            if self.total_token_count > self.max_tokens {
                // How many tokens we're over by
                let mut excess = self.total_token_count - self.max_tokens;

                // Remove the oldest messages until we've cleared at least `excess` tokens
                while excess > 0 && !self.conversation_history.is_empty() {
                    let msg = self.conversation_history.remove(0);
                    let removed = estimate_message_token_count(&msg);
                    excess = excess.saturating_sub(removed);
                }
            }
        }
    }
}

/// Estimates the number of tokens in a string.
/// Uses an approximate formula: one token per 4 characters.
pub fn estimate_token_count(text: &str) -> usize {
    (text.len() / 4).max(1)
}

/// Estimates the number of tokens in a Message, including role annotations.
pub fn estimate_message_token_count(message: &Message) -> usize {
    // The role annotation costs roughly one token
    let role_token_count = 1;
    let content_token_count = estimate_token_count(&message.content);
    role_token_count + content_token_count
}
