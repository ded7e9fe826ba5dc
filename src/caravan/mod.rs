// src/caravan/mod.rs

pub mod agent;
pub mod client_wrapper;
pub mod clients;
pub mod event;
pub mod llm_session;
pub mod memory_log;
pub mod model_factory;
pub mod react;
pub mod stdio_server;
pub mod team;
pub mod tool_protocol;
pub mod tool_protocols;
pub mod tools;
pub mod travel;

// Export the session and agent types at the module root so they can be used
// as caravan::LLMSession / caravan::Agent instead of the full paths.
pub use agent::Agent;
pub use llm_session::LLMSession;
