//! Example: Agent with long-term (persistent) memory.
//!
//! Long-term memory lives in a per-user, hash-chained `.jsonl` log that
//! survives process restarts. On every run this demo:
//!
//! 1. opens (or creates) the log for `demo_user`,
//! 2. resumes an agent with the stored memories injected as context,
//! 3. asks a question that benefits from them,
//! 4. records one new memory for next time.
//!
//! Run it twice and watch the second answer use what the first run stored.
//!
//! # Usage
//!
//! ```bash
//! MODEL_PROVIDER=ollama OLLAMA_MODEL_ID=qwen3:8b OLLAMA_TEMPERATURE=0.2 \
//!     cargo run --example agent_with_memory_log
//! ```

use std::path::Path;
use std::sync::Arc;

use caravan::memory_log::{MemoryKind, MemoryLog};
use caravan::model_factory::ModelFactory;
use caravan::Agent;
use tokio::sync::RwLock;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    caravan::init_logger();

    let log = MemoryLog::open(Path::new("tmp_memory"), "demo_user")?;
    let known = log.entries().len();
    println!(
        "Opened memory log for '{}' with {} stored entries (chain intact: {})",
        log.user_id(),
        known,
        log.verify_integrity()
    );

    let log = Arc::new(RwLock::new(log));

    let mut agent = Agent::resume_from_memory(
        "travel-assistant",
        "Travel Assistant",
        ModelFactory::create_client()?,
        32_000,
        log,
    )?;
    agent.set_system_prompt(
        "You help the user plan trips. Prefer what you already know about them \
         over asking again.",
    );

    let question = if known == 0 {
        "I'm planning a trip: I live in London, I love beaches, and my budget \
         is usually around £2000. Where in Tunisia should I go?"
    } else {
        "Where should I go on my next holiday? Use what you know about me."
    };

    println!("\nUser: {}\n", question);
    let response = agent.send(question).await?;
    println!("Assistant: {}\n", response.content);

    // Record durable facts for the next session
    if known == 0 {
        agent
            .remember(MemoryKind::Fact, "Travels from London")
            .await?;
        agent
            .remember(MemoryKind::Preference, "Prefers beach destinations")
            .await?;
        agent
            .remember(MemoryKind::Fact, "Typical budget around £2000")
            .await?;
        println!("Stored 3 memories; run this demo again to see them recalled.");
    } else if let Some(entries) = agent.memory_entries().await {
        println!("Memories on file:");
        for entry in entries {
            println!("  - {:?}: {}", entry.kind, entry.content);
        }
    }

    Ok(())
}
