//! Example: Agent with short-term (session) memory.
//!
//! Short-term memory is the agent's own rolling session history: earlier
//! turns stay in context (token-trimmed, oldest first) without any storage.
//! The agent reads a file with its file tool in turn one, does unrelated
//! work in turn two, and is asked in turn three to recall the file content
//! *without* using any tool — which only works because the first turn is
//! still in its session.
//!
//! # Usage
//!
//! ```bash
//! MODEL_PROVIDER=ollama OLLAMA_MODEL_ID=qwen3:8b OLLAMA_TEMPERATURE=0.2 \
//!     cargo run --example agent_with_session_memory
//! ```

use std::sync::Arc;

use caravan::event::ConsoleEventHandler;
use caravan::model_factory::ModelFactory;
use caravan::tool_protocol::ToolRegistry;
use caravan::tools::FileReaderTool;
use caravan::Agent;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    caravan::init_logger();

    let mut registry = ToolRegistry::empty();
    registry
        .add_protocol("files", Arc::new(FileReaderTool::new()))
        .await?;

    let mut agent = Agent::new("assistant", "Project Assistant", ModelFactory::create_client()?)
        .with_expertise("Answering questions about the local project")
        .with_tools(registry)
        .with_event_handler(Arc::new(ConsoleEventHandler));
    agent.set_system_prompt("Be concise. Use tools only when asked to look something up.");

    println!("--- Turn 1: read a file ---");
    let first = agent
        .send("Read the Cargo.toml file in the current directory and summarize what it declares.")
        .await?;
    println!("{}\n", first.content);

    println!("--- Turn 2: unrelated question ---");
    let second = agent
        .send("What are common delegation modes for multi-agent teams? One sentence.")
        .await?;
    println!("{}\n", second.content);

    println!("--- Turn 3: recall from session memory, no tools ---");
    let third = agent
        .send("What was in the Cargo.toml file from earlier? Don't use any tool.")
        .await?;
    println!("{}\n", third.content);

    println!(
        "Session now holds {} messages of rolling context.",
        agent.session_history_len()
    );

    Ok(())
}
