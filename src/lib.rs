//! # Caravan
//!
//! Caravan is a Rust toolkit for composing LLM-backed agents into teams,
//! wiring them to tools, and printing their (optionally streamed) responses.
//!
//! The crate provides carefully layered abstractions for:
//!
//! * **Provider Selection**: [`model_factory::ModelFactory`] resolves a local
//!   (Ollama) or hosted (OpenAI) endpoint from environment variables and hands
//!   back a [`ClientWrapper`] with model id and temperature
//! * **Agents with Tools**: [`Agent`] connects an LLM to actions through the
//!   multi-protocol [`tool_protocol::ToolRegistry`]
//! * **Tool Routing**: local Rust functions, a stdio tool-server child process,
//!   web search, and file reads all behind one unified interface
//! * **Tool Serving**: [`stdio_server::StdioToolServer`] exposes aggregated
//!   tools to an external agent runtime over newline-delimited JSON on stdio
//! * **Stateful Conversations**: [`LLMSession`] maintains rolling conversation
//!   history with context trimming and token accounting
//! * **Team Delegation**: the [`team`] module coordinates members sequentially
//!   or in parallel, nests sub-teams for hybrid topologies, and synthesizes a
//!   final answer with a coordinator model
//! * **Iterative Reasoning**: [`react::ReactAgent`] runs the
//!   Thought → Action → Observation loop over the tool registry
//! * **Persistent Memory**: [`memory_log::MemoryLog`] carries user facts and
//!   preferences across sessions as a hash-chained `.jsonl` log
//!
//! ## Core Concepts
//!
//! ### LLMSession: Stateful Conversations (The Foundation)
//!
//! [`LLMSession`] wraps a client to maintain a rolling conversation history
//! with automatic context trimming and token accounting:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use caravan::{LLMSession, Role};
//! use caravan::clients::openai::{Model, OpenAIClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(OpenAIClient::new_with_model_enum(
//!         &std::env::var("OPENAI_API_KEY")?,
//!         Model::GPT41Mini,
//!     ));
//!
//!     let mut session = LLMSession::new(client, "You are helpful.".into(), 8_192);
//!
//!     let reply = session
//!         .send_message(Role::User, "Hello, how are you?".into())
//!         .await?;
//!
//!     println!("Assistant: {}", reply.content);
//!     println!("Tokens used: {:?}", session.token_usage());
//!     Ok(())
//! }
//! ```
//!
//! ### Agents and Teams
//!
//! [`Agent`] extends [`LLMSession`] with identity, instructions, and tools;
//! the [`team`] module composes agents (and nested sub-teams) under a
//! delegation mode:
//!
//! ```rust,no_run
//! use caravan::{Agent, team::{Team, TeamMode}};
//! use caravan::model_factory::ModelFactory;
//!
//! # async {
//! let client = ModelFactory::create_client()?;
//!
//! let mut team = Team::new("planners", "Travel Planning Team")
//!     .with_mode(TeamMode::Coordinate)
//!     .with_coordinator(client.clone())
//!     .share_member_interactions(true);
//!
//! team.add_member(
//!     Agent::new("flights", "Flight Specialist", client.clone())
//!         .with_expertise("Find flight options using the booking system"),
//! )?;
//! team.add_member(
//!     Agent::new("hotels", "Hotel Specialist", client)
//!         .with_expertise("Find hotel options using the booking system"),
//! )?;
//!
//! let response = team.run("Plan a 5-day trip to Tunisia from London.").await?;
//! println!("{}", response.final_answer.unwrap_or_default());
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! # };
//! ```
//!
//! ### Serving Tools over Stdio
//!
//! The travel lookup service ships as a ready-made tool protocol; serve it to
//! an external runtime with three lines (see `demos/travel_tool_server.rs`):
//!
//! ```rust,no_run
//! use caravan::stdio_server::StdioToolServer;
//! use caravan::travel::TravelToolProtocol;
//! use std::sync::Arc;
//!
//! # async {
//! let mut server = StdioToolServer::new();
//! server.register_protocol(Arc::new(TravelToolProtocol::new())).await.unwrap();
//! server.serve().await.unwrap();
//! # };
//! ```
//!
//! On the agent side, [`tool_protocols::StdioClientProtocol`] spawns the
//! server as a child process and makes its tools available transparently
//! through the registry.
//!
//! Continue exploring the modules re-exported from the crate root for
//! progressively richer interaction patterns; each demo under `demos/` is a
//! complete program exercising one of them.

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// The helper is intentionally lightweight so that applications embedding
/// caravan can opt in to simple `RUST_LOG` driven diagnostics without having
/// to choose a specific logging backend upfront. Diagnostics go to stderr, so
/// the stdio tool-server wire on stdout stays clean.
///
/// ```rust
/// caravan::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

// Import the top-level `caravan` module.
pub mod caravan;

// Re-exporting key items for easier external access.
pub use caravan::agent::{Agent, AgentResponse};
pub use caravan::client_wrapper;
pub use caravan::client_wrapper::{
    ClientWrapper, Message, MessageChunk, MessageChunkStream, Role, TokenUsage,
};
pub use caravan::clients;
pub use caravan::event;
pub use caravan::event::{AgentEvent, ConsoleEventHandler, EventHandler, ReactEvent, TeamEvent};
pub use caravan::llm_session;
pub use caravan::llm_session::LLMSession;
pub use caravan::memory_log;
pub use caravan::memory_log::{MemoryEntry, MemoryKind, MemoryLog};
pub use caravan::model_factory;
pub use caravan::model_factory::{ModelFactory, ModelProvider};
pub use caravan::react;
pub use caravan::react::ReactAgent;
pub use caravan::stdio_server;
pub use caravan::team;
pub use caravan::tool_protocol;
pub use caravan::tool_protocols;
pub use caravan::tools;
pub use caravan::travel;
