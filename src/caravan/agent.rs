//! Agent System
//!
//! This module provides the core [`Agent`] struct that represents an LLM-powered
//! actor with identity, a role, free-form instructions, optional tool access,
//! optional persistent memory, and real-time event observability.
//!
//! Agents are the fundamental building blocks of this crate and can be used:
//! - Standalone for single-agent interactions
//! - As members of a [`Team`](crate::team::Team)
//! - In custom workflows for specialized use cases
//!
//! # Core Components
//!
//! - **Agent**: identity plus capabilities
//! - **LLMSession**: each agent wraps its own session with rolling history and token tracking
//! - **Tool Access**: agents can be granted a [`ToolRegistry`](crate::tool_protocol::ToolRegistry)
//!   (own or shared across agents)
//! - **MemoryLog**: optional persistent, hash-chained memory of user facts and preferences
//! - **EventHandler**: optional callback for real-time observability of LLM calls and tool usage
//!
//! # Example
//!
//! ```rust,no_run
//! use caravan::Agent;
//! use caravan::clients::openai::OpenAIClient;
//! use std::sync::Arc;
//!
//! let agent = Agent::new(
//!     "flight-specialist",
//!     "Flight Specialist",
//!     Arc::new(OpenAIClient::new_with_model_string("key", "gpt-4o-mini")),
//! )
//! .with_expertise("Find flight options using the booking system")
//! .with_instructions(
//!     "You find flights from London to Tunisia using the search_flights tool.\n\
//!      Focus on prices in British Pounds (£).\n\
//!      Provide flight information only; never hotel information.",
//! );
//! ```

use crate::caravan::event::{AgentEvent, EventHandler};
use crate::caravan::llm_session::LLMSession;
use crate::caravan::memory_log::{MemoryEntry, MemoryKind, MemoryLog};
use crate::caravan::tool_protocol::{ToolProtocol, ToolRegistry};
use crate::client_wrapper::{ClientWrapper, Role, TokenUsage};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::io;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Default context window granted to new agents.
const DEFAULT_MAX_TOKENS: usize = 128_000;

/// Upper bound on tool round-trips within a single `send()` call.
const MAX_TOOL_ITERATIONS: usize = 5;

/// Internal representation of a parsed tool call extracted from an LLM response.
///
/// [`Agent::send`] scans LLM output for JSON fragments matching
/// `{"tool_call": {"name": "...", "parameters": {...}}}` and routes the call
/// through the agent's [`ToolRegistry`].
#[derive(Debug, Clone)]
struct ToolCall {
    /// Name of the tool to execute (e.g. `"search_flights"`, `"web_search"`).
    name: String,
    /// Raw JSON parameters extracted from the LLM's tool call request.
    parameters: serde_json::Value,
}

/// Response body returned after asking an agent to generate content.
///
/// Wraps both the final text output and optional token-usage accounting.
/// When the agent makes multiple tool calls during a single generation cycle,
/// the `tokens_used` field aggregates usage across all LLM round-trips.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// Final message content produced across tool iterations.
    pub content: String,
    /// Optional token usage aggregated across all tool iterations.
    pub tokens_used: Option<TokenUsage>,
}

/// Error raised when an agent's LLM call or tool routing fails.
#[derive(Debug, Clone)]
pub struct AgentError(pub String);

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Agent error: {}", self.0)
    }
}

impl Error for AgentError {}

/// Represents an agent with identity, expertise, optional tool access, and
/// event observability.
///
/// Agents are LLM-powered entities that can:
/// - Generate responses based on system prompts and user messages
/// - Access tools through a [`ToolRegistry`] (own or shared)
/// - Maintain per-agent conversation memory via [`LLMSession`]
/// - Carry user knowledge across sessions via [`MemoryLog`]
/// - Emit [`AgentEvent`]s for real-time observability
pub struct Agent {
    /// Stable identifier referenced by team coordination.
    pub id: String,
    /// Human-readable display name for logging and transcripts.
    pub name: String,
    /// Free-form description of the agent's role, embedded into prompts.
    pub expertise: Option<String>,
    /// Persona hints that help diversify the tone of generated responses.
    pub personality: Option<String>,
    /// Task instructions appended to the system prompt verbatim.
    pub instructions: Option<String>,
    /// Arbitrary metadata associated with the agent (e.g. department, region).
    pub metadata: HashMap<String, String>,

    session: LLMSession,
    tool_registry: Arc<RwLock<ToolRegistry>>,
    memory_log: Option<Arc<RwLock<MemoryLog>>>,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl Agent {
    /// Create a new agent with the mandatory identity information.
    ///
    /// Internally creates an [`LLMSession`] with the provided client, an empty
    /// system prompt, and a 128k token budget. Tools default to an empty
    /// [`ToolRegistry`].
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        client: Arc<dyn ClientWrapper>,
    ) -> Self {
        let session = LLMSession::new(client, String::new(), DEFAULT_MAX_TOKENS);
        Self {
            id: id.into(),
            name: name.into(),
            expertise: None,
            personality: None,
            instructions: None,
            metadata: HashMap::new(),
            session,
            tool_registry: Arc::new(RwLock::new(ToolRegistry::empty())),
            memory_log: None,
            event_handler: None,
        }
    }

    /// Resume an agent whose [`MemoryLog`] already holds user knowledge.
    ///
    /// The log's [`recall_prompt`](MemoryLog::recall_prompt) is injected into
    /// a fresh session as a system message, so the agent starts with its
    /// long-term memory already in context.
    pub fn resume_from_memory(
        id: impl Into<String>,
        name: impl Into<String>,
        client: Arc<dyn ClientWrapper>,
        max_tokens: usize,
        memory_log: Arc<RwLock<MemoryLog>>,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let mut session = LLMSession::new(client, String::new(), max_tokens);

        // Construction-time read; the log is not shared with anything yet.
        let recall = {
            let guard = memory_log.try_read().map_err(|_| {
                Box::new(io::Error::other("MemoryLog is locked")) as Box<dyn Error + Send + Sync>
            })?;
            guard.recall_prompt()
        };

        if !recall.is_empty() {
            session.inject_message(Role::System, recall);
        }

        Ok(Self {
            id: id.into(),
            name: name.into(),
            expertise: None,
            personality: None,
            instructions: None,
            metadata: HashMap::new(),
            session,
            tool_registry: Arc::new(RwLock::new(ToolRegistry::empty())),
            memory_log: Some(memory_log),
            event_handler: None,
        })
    }

    /// Attach a brief description of the agent's domain expertise.
    pub fn with_expertise(mut self, expertise: impl Into<String>) -> Self {
        self.expertise = Some(expertise.into());
        self
    }

    /// Attach a personality descriptor used to diversify prompts.
    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = Some(personality.into());
        self
    }

    /// Attach task instructions appended verbatim to the system prompt.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Add arbitrary metadata to the agent definition.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Override the default token budget (builder pattern).
    ///
    /// Recreates the internal [`LLMSession`] with the new budget while keeping
    /// the same client. History is reset (the session starts empty).
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        let client = self.session.client().clone();
        self.session = LLMSession::new(client, String::new(), max_tokens);
        self
    }

    /// Grant the agent access to a registry of tools.
    ///
    /// Takes ownership of the registry and wraps it in `Arc<RwLock<_>>`.
    pub fn with_tools(mut self, registry: ToolRegistry) -> Self {
        self.tool_registry = Arc::new(RwLock::new(registry));
        self
    }

    /// Share a mutable tool registry across multiple agents.
    ///
    /// Runtime mutations (add/remove protocols) are visible to every agent
    /// sharing the same registry. Use this when team members should all see
    /// the same tool set — e.g. one booking-server connection shared by the
    /// flight and hotel specialists.
    pub fn with_shared_tools(mut self, registry: Arc<RwLock<ToolRegistry>>) -> Self {
        self.tool_registry = registry;
        self
    }

    /// Attach a [`MemoryLog`] for persistent user memory (builder pattern).
    ///
    /// Once attached, the agent can record entries via [`remember`](Agent::remember).
    /// The log is wrapped in `Arc<RwLock<_>>` so it can be shared across
    /// forked agents or accessed concurrently.
    pub fn with_memory_log(mut self, log: Arc<RwLock<MemoryLog>>) -> Self {
        self.memory_log = Some(log);
        self
    }

    /// Attach an [`EventHandler`] that will receive lifecycle events (builder pattern).
    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Set or replace the event handler at runtime.
    ///
    /// Unlike [`with_event_handler`](Agent::with_event_handler) (which consumes
    /// `self` in the builder chain), this takes `&mut self` so a
    /// [`Team`](crate::team::Team) can propagate its handler to each member.
    pub fn set_event_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.event_handler = Some(handler);
    }

    /// Emit an [`AgentEvent`] to the registered handler.
    ///
    /// If no handler is registered, this is a no-op.
    async fn emit(&self, event: AgentEvent) {
        if let Some(handler) = &self.event_handler {
            handler.on_agent_event(&event).await;
        }
    }

    // ---- Runtime tool mutation ----

    /// Add a new tool protocol at runtime.
    ///
    /// The protocol is discovered (its tools are listed) and then registered
    /// under `label`. If the agent's tool registry is shared via
    /// [`with_shared_tools`](Agent::with_shared_tools), the new protocol is
    /// immediately visible to all agents sharing the same registry.
    pub async fn add_protocol(
        &self,
        label: &str,
        protocol: Arc<dyn ToolProtocol>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut registry = self.tool_registry.write().await;
        let result = registry.add_protocol(label, protocol).await;
        if result.is_ok() {
            self.emit(AgentEvent::ProtocolAdded {
                agent_id: self.id.clone(),
                agent_name: self.name.clone(),
                protocol_label: label.to_string(),
            })
            .await;
        }
        result
    }

    /// Remove a tool protocol at runtime.
    ///
    /// All tools registered under `label` are removed. If the protocol label
    /// does not exist, this is a no-op.
    pub async fn remove_protocol(&self, label: &str) {
        let mut registry = self.tool_registry.write().await;
        registry.remove_protocol(label);
        self.emit(AgentEvent::ProtocolRemoved {
            agent_id: self.id.clone(),
            agent_name: self.name.clone(),
            protocol_label: label.to_string(),
        })
        .await;
    }

    /// List all tool names currently available to this agent.
    pub async fn list_tools(&self) -> Vec<String> {
        let registry = self.tool_registry.read().await;
        registry
            .list_tools()
            .iter()
            .map(|m| m.name.clone())
            .collect()
    }

    // ---- MemoryLog convenience methods ----

    /// Append an entry to this agent's [`MemoryLog`].
    ///
    /// This is a convenience wrapper that acquires a write lock on the log and
    /// calls [`MemoryLog::append`]. If no log is attached, the call is a
    /// silent no-op.
    pub async fn remember(&self, kind: MemoryKind, content: impl Into<String>) -> io::Result<()> {
        if let Some(log) = &self.memory_log {
            let mut log = log.write().await;
            log.append(kind, &content.into())?;
            self.emit(AgentEvent::MemoryCommitted {
                agent_id: self.id.clone(),
                agent_name: self.name.clone(),
            })
            .await;
        }
        Ok(())
    }

    /// Return a snapshot of all entries in this agent's memory log.
    ///
    /// Returns `None` if no [`MemoryLog`] is attached.
    pub async fn memory_entries(&self) -> Option<Vec<MemoryEntry>> {
        if let Some(log) = &self.memory_log {
            let log = log.read().await;
            Some(log.entries().to_vec())
        } else {
            None
        }
    }

    // ---- fork() — replaces Clone for parallel execution ----

    /// Create a lightweight copy for parallel execution.
    ///
    /// The fork shares the same tool registry and memory log (via `Arc`) but
    /// has a **fresh, empty** [`LLMSession`] backed by the same client.
    /// Identity fields are cloned.
    ///
    /// This replaces `Clone` — `Agent` is intentionally not `Clone` because
    /// cloning a populated session would be semantically misleading for
    /// parallel fan-out.
    pub fn fork(&self) -> Self {
        let client = self.session.client().clone();
        let max_tokens = self.session.get_max_tokens();
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            expertise: self.expertise.clone(),
            personality: self.personality.clone(),
            instructions: self.instructions.clone(),
            metadata: self.metadata.clone(),
            session: LLMSession::new(client, String::new(), max_tokens),
            tool_registry: Arc::clone(&self.tool_registry),
            memory_log: self.memory_log.clone(),
            event_handler: self.event_handler.clone(),
        }
    }

    /// Create a lightweight copy that also carries forward session context.
    ///
    /// Like [`fork`](Agent::fork), but additionally copies the current system
    /// prompt and conversation history into the new session. Use this when a
    /// parallel task needs the accumulated context.
    pub fn fork_with_context(&self) -> Self {
        let mut forked = self.fork();
        forked
            .session
            .set_system_prompt(self.session.system_prompt_text().to_string());
        for msg in self.session.get_conversation_history() {
            forked
                .session
                .inject_message(msg.role.clone(), msg.content.clone());
        }
        forked
    }

    // ---- Session-based methods for hub-routed coordination ----

    /// Set the agent's session system prompt, augmented with its identity.
    ///
    /// Called by team modes during setup so each member has its system prompt
    /// configured once before generation begins.
    pub fn set_system_prompt(&mut self, base_prompt: &str) {
        let augmented = self.augment_system_prompt(base_prompt);
        self.session.set_system_prompt(augmented);
    }

    /// Inject a message into this agent's session history without sending to the LLM.
    ///
    /// Used by team hub-routing to feed specific messages (e.g. other members'
    /// responses) into this agent's context before calling [`send`](Agent::send).
    pub fn receive_message(&mut self, role: Role, content: String) {
        self.session.inject_message(role, content);
    }

    /// Return the number of messages in this agent's session history.
    pub fn session_history_len(&self) -> usize {
        self.session.get_conversation_history().len()
    }

    /// Borrow the underlying [`ClientWrapper`] from the session.
    ///
    /// Useful for creating new sessions or agents that share the same LLM
    /// provider connection.
    pub fn client(&self) -> &Arc<dyn ClientWrapper> {
        self.session.client()
    }

    /// Send a message using the agent's own session history.
    ///
    /// The session handles system prompt, history, and auto-trimming
    /// automatically.
    ///
    /// # Tool Loop
    ///
    /// After the initial LLM call, the method checks whether the response
    /// contains a tool call (`{"tool_call": {"name": "...", "parameters": {...}}}`).
    /// If so, the tool is executed via the [`ToolRegistry`], the result is fed
    /// back into the session as a follow-up message, and the LLM is called
    /// again. The loop runs for up to 5 iterations; hitting the cap appends a
    /// warning to the final response.
    pub async fn send(
        &mut self,
        user_message: &str,
    ) -> Result<AgentResponse, Box<dyn Error + Send + Sync>> {
        let preview_end = user_message
            .char_indices()
            .nth(120)
            .map(|(i, _)| i)
            .unwrap_or(user_message.len());
        self.emit(AgentEvent::SendStarted {
            agent_id: self.id.clone(),
            agent_name: self.name.clone(),
            message_preview: user_message[..preview_end].to_string(),
        })
        .await;

        let message_with_tools = self.append_tool_descriptions(user_message).await;

        let mut tool_iteration = 0;
        let mut total_input_tokens = 0;
        let mut total_output_tokens = 0;
        let mut total_tokens = 0;

        self.emit(AgentEvent::LLMCallStarted {
            agent_id: self.id.clone(),
            agent_name: self.name.clone(),
            iteration: 1,
        })
        .await;

        let response = self
            .session
            .send_message(Role::User, message_with_tools)
            .await
            .map_err(|e| Box::new(AgentError(e.to_string())) as Box<dyn Error + Send + Sync>)?;

        if let Some(usage) = self.session.client().get_last_usage().await {
            total_input_tokens += usage.input_tokens;
            total_output_tokens += usage.output_tokens;
            total_tokens += usage.total_tokens;
        }

        self.emit(AgentEvent::LLMCallCompleted {
            agent_id: self.id.clone(),
            agent_name: self.name.clone(),
            iteration: 1,
            tokens_used: usage_snapshot(total_input_tokens, total_output_tokens, total_tokens),
            response_length: response.content.len(),
        })
        .await;

        let mut current_response = response.content;

        loop {
            let tool_call = match parse_tool_call(&current_response) {
                Some(tool_call) => tool_call,
                None => break,
            };

            if tool_iteration >= MAX_TOOL_ITERATIONS {
                self.emit(AgentEvent::ToolMaxIterationsReached {
                    agent_id: self.id.clone(),
                    agent_name: self.name.clone(),
                })
                .await;
                current_response = format!(
                    "{}\n\n[Warning: Maximum tool iterations reached]",
                    current_response
                );
                break;
            }
            tool_iteration += 1;

            self.emit(AgentEvent::ToolCallDetected {
                agent_id: self.id.clone(),
                agent_name: self.name.clone(),
                tool_name: tool_call.name.clone(),
                parameters: tool_call.parameters.clone(),
                iteration: tool_iteration,
            })
            .await;

            // Execute the tool
            let tool_result = {
                let registry = self.tool_registry.read().await;
                registry
                    .execute_tool(&tool_call.name, tool_call.parameters.clone())
                    .await
            };

            let (tool_result_message, tool_success, tool_error) = match &tool_result {
                Ok(result) => {
                    if result.success {
                        (
                            format!(
                                "Tool '{}' executed successfully. Result: {}",
                                tool_call.name,
                                result.output_text()
                            ),
                            true,
                            None,
                        )
                    } else {
                        let err = result
                            .error
                            .clone()
                            .unwrap_or_else(|| "Unknown error".to_string());
                        (
                            format!("Tool '{}' failed. Error: {}", tool_call.name, err),
                            false,
                            Some(err),
                        )
                    }
                }
                Err(e) => (
                    format!("Tool execution error: {}", e),
                    false,
                    Some(e.to_string()),
                ),
            };

            self.emit(AgentEvent::ToolExecutionCompleted {
                agent_id: self.id.clone(),
                agent_name: self.name.clone(),
                tool_name: tool_call.name.clone(),
                success: tool_success,
                error: tool_error,
                iteration: tool_iteration,
            })
            .await;

            // Send tool result back through the session
            let next_iteration = tool_iteration + 1;
            self.emit(AgentEvent::LLMCallStarted {
                agent_id: self.id.clone(),
                agent_name: self.name.clone(),
                iteration: next_iteration,
            })
            .await;

            let follow_up = self
                .session
                .send_message(Role::User, tool_result_message)
                .await
                .map_err(|e| Box::new(AgentError(e.to_string())) as Box<dyn Error + Send + Sync>)?;

            if let Some(usage) = self.session.client().get_last_usage().await {
                total_input_tokens += usage.input_tokens;
                total_output_tokens += usage.output_tokens;
                total_tokens += usage.total_tokens;
            }

            self.emit(AgentEvent::LLMCallCompleted {
                agent_id: self.id.clone(),
                agent_name: self.name.clone(),
                iteration: next_iteration,
                tokens_used: usage_snapshot(total_input_tokens, total_output_tokens, total_tokens),
                response_length: follow_up.content.len(),
            })
            .await;

            current_response = follow_up.content;
        }

        let tokens_used = usage_snapshot(total_input_tokens, total_output_tokens, total_tokens);

        self.emit(AgentEvent::SendCompleted {
            agent_id: self.id.clone(),
            agent_name: self.name.clone(),
            tokens_used: tokens_used.clone(),
            tool_calls_made: tool_iteration,
            response_length: current_response.len(),
        })
        .await;

        Ok(AgentResponse {
            content: current_response,
            tokens_used,
        })
    }

    /// Generate the system prompt augmented with the agent's identity.
    fn augment_system_prompt(&self, base_prompt: &str) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!("You are {}.\n", self.name));

        if let Some(expertise) = &self.expertise {
            prompt.push_str(&format!("Your role: {}\n", expertise));
        }

        if let Some(personality) = &self.personality {
            prompt.push_str(&format!("Your approach: {}\n", personality));
        }

        prompt.push('\n');
        prompt.push_str(base_prompt);

        if let Some(instructions) = &self.instructions {
            prompt.push_str("\n\nInstructions:\n");
            prompt.push_str(instructions);
        }

        prompt
    }

    /// Append tool descriptions and the calling convention to a user message.
    async fn append_tool_descriptions(&self, user_message: &str) -> String {
        let mut message = user_message.to_string();
        let registry = self.tool_registry.read().await;
        let tools = registry.list_tools();
        if tools.is_empty() {
            return message;
        }

        message.push_str("\n\nYou have access to the following tools:\n");
        for tool_metadata in tools {
            message.push_str(&format!(
                "- {}: {}\n",
                tool_metadata.name, tool_metadata.description
            ));
            if !tool_metadata.parameters.is_empty() {
                message.push_str("  Parameters:\n");
                for param in &tool_metadata.parameters {
                    message.push_str(&format!(
                        "    - {} ({:?}{}): {}\n",
                        param.name,
                        param.param_type,
                        if param.required { ", required" } else { "" },
                        param.description.as_deref().unwrap_or("No description")
                    ));
                }
            }
        }
        message.push_str(
            "\nTo use a tool, respond with a JSON object in the following format:\n\
             {\"tool_call\": {\"name\": \"tool_name\", \"parameters\": {...}}}\n\
             After tool execution, I'll provide the result and you can continue.\n",
        );

        message
    }
}

/// Build a [`TokenUsage`] snapshot, or `None` when nothing was tracked.
fn usage_snapshot(input: usize, output: usize, total: usize) -> Option<TokenUsage> {
    if total > 0 {
        Some(TokenUsage {
            input_tokens: input,
            output_tokens: output,
            total_tokens: total,
        })
    } else {
        None
    }
}

/// Parse a tool call from an LLM response.
///
/// Scans the response text for a JSON fragment matching the pattern:
/// `{"tool_call": {"name": "tool_name", "parameters": {...}}}`.
///
/// Uses brace-counting to find the matching closing `}` rather than parsing
/// the entire response as JSON, which handles the common case where the LLM
/// wraps the tool call in surrounding prose. Only the *first* tool call in
/// the response is extracted.
fn parse_tool_call(response: &str) -> Option<ToolCall> {
    let start_idx = response.find("{\"tool_call\"")?;

    // Brace-count to the matching closing brace
    let mut brace_count = 0;
    let mut end_idx = start_idx;
    for (i, ch) in response.char_indices().skip_while(|(i, _)| *i < start_idx) {
        if ch == '{' {
            brace_count += 1;
        } else if ch == '}' {
            brace_count -= 1;
            if brace_count == 0 {
                end_idx = i + ch.len_utf8();
                break;
            }
        }
    }

    if end_idx <= start_idx {
        return None;
    }

    let json_str = &response[start_idx..end_idx];
    let parsed: serde_json::Value = serde_json::from_str(json_str).ok()?;
    let tool_call_obj = parsed.get("tool_call")?;
    let name = tool_call_obj.get("name")?.as_str()?;
    let parameters = tool_call_obj.get("parameters")?;

    Some(ToolCall {
        name: name.to_string(),
        parameters: parameters.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_call_in_prose() {
        let response = r#"Let me look that up.
{"tool_call": {"name": "search_flights", "parameters": {"destination": "Tunis", "budget": 200}}}
I'll report back shortly."#;

        let call = parse_tool_call(response).expect("tool call should parse");
        assert_eq!(call.name, "search_flights");
        assert_eq!(call.parameters["destination"], "Tunis");
        assert_eq!(call.parameters["budget"], 200);
    }

    #[test]
    fn test_parse_tool_call_absent() {
        assert!(parse_tool_call("Just a plain answer with no JSON.").is_none());
        assert!(parse_tool_call("{\"tool_call\": {\"name\": \"x\"").is_none());
    }
}
