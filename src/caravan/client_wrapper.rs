use async_trait::async_trait;
use futures_util::Stream;
use std::error::Error;
use std::pin::Pin;
use tokio::sync::Mutex;

/// A ClientWrapper is a wrapper around a specific LLM endpoint.
/// It provides a common interface to interact with the models.
/// It does not keep track of the conversation/session, for that we use an LLMSession
/// which keeps track of the conversation history and other session-specific data
/// and uses a ClientWrapper to interact with the LLM.

/// Represents the possible roles for a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    /// Set by the developer to steer the model's responses.
    System,
    /// A message sent by a human user (or app user).
    User,
    /// Lets the model know the content was generated as a response to a user message.
    Assistant,
}

/// How many tokens were spent on prompt vs. completion.
#[derive(Clone, Debug)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub total_tokens: usize,
}

/// Represents a generic message to be sent to an LLM.
#[derive(Clone, Debug)]
pub struct Message {
    /// The role associated with the message.
    pub role: Role,
    /// The actual content of the message.
    pub content: String,
}

/// Represents a chunk of a streaming message response.
#[derive(Clone, Debug)]
pub struct MessageChunk {
    /// The incremental content in this chunk.
    pub content: String,
    /// Whether this is the final chunk in the stream.
    pub is_final: bool,
}

/// Type alias for a Send-able error box.
pub type SendError = Box<dyn Error + Send>;

/// Type alias for the chunk stream returned by [`ClientWrapper::send_message_stream`].
///
/// The stream is not required to be `Send` and must be consumed in the task
/// that created it.
pub type MessageChunkStream = Pin<Box<dyn Stream<Item = Result<MessageChunk, SendError>>>>;

/// Trait defining the interface to interact with various LLM endpoints.
#[async_trait]
pub trait ClientWrapper: Send + Sync {
    /// The model identifier this client will inject into each request.
    fn model_name(&self) -> &str;

    /// Send a message to the LLM and get a response.
    /// - `messages`: The messages to send in the request.
    async fn send_message(&self, messages: &[Message]) -> Result<Message, Box<dyn Error>>;

    /// Send a message to the LLM and get a streaming response.
    ///
    /// Returns a stream of [`MessageChunk`] items, allowing tokens to be
    /// processed as they arrive. The default implementation returns an error
    /// so existing implementations don't break; clients that support
    /// streaming should override this.
    async fn send_message_stream(
        &self,
        _messages: &[Message],
    ) -> Result<MessageChunkStream, Box<dyn Error>> {
        Err("Streaming not supported by this client".into())
    }

    /// Hook to retrieve usage from the *last* send_message() call.
    /// Default impl reads the usage slot so wrappers only have to expose one.
    async fn get_last_usage(&self) -> Option<TokenUsage> {
        match self.usage_slot() {
            Some(slot) => slot.lock().await.clone(),
            None => None,
        }
    }

    /// ClientWrapper implementations supporting TokenUsage tracking should
    /// return their `Mutex<Option<TokenUsage>>` by overriding this method.
    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        None
    }
}

impl std::fmt::Debug for dyn ClientWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientWrapper")
            .field("model_name", &self.model_name())
            .finish()
    }
}
