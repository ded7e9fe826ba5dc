//! Example: Simple agent with a web search tool.
//!
//! The smallest useful composition: one agent, one tool, one question.
//!
//! # Usage
//!
//! ```bash
//! TAVILY_API_KEY=tvly-... \
//! MODEL_PROVIDER=ollama OLLAMA_MODEL_ID=qwen3:8b OLLAMA_TEMPERATURE=0.7 \
//!     cargo run --example agent_with_tools
//! ```

use std::sync::Arc;

use caravan::event::ConsoleEventHandler;
use caravan::model_factory::ModelFactory;
use caravan::tool_protocol::ToolRegistry;
use caravan::tools::WebSearchTool;
use caravan::Agent;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    caravan::init_logger();

    let query = "What are the latest trends in AI for 2025?";

    let mut registry = ToolRegistry::empty();
    registry
        .add_protocol(
            "web",
            Arc::new(
                WebSearchTool::from_env()?
                    .with_search_depth("advanced")
                    .with_max_results(5),
            ),
        )
        .await?;

    let mut agent = Agent::new("assistant", "Research Assistant", ModelFactory::create_client()?)
        .with_expertise("Finding and summarizing current information")
        .with_tools(registry)
        .with_event_handler(Arc::new(ConsoleEventHandler));
    agent.set_system_prompt("Answer with grounded, sourced information.");

    println!("Question: {}\n", query);

    let response = agent.send(query).await?;
    println!("\n{}", response.content);

    if let Some(usage) = response.tokens_used {
        println!(
            "\nTokens: input {}, output {}, total {}",
            usage.input_tokens, usage.output_tokens, usage.total_tokens
        );
    }

    Ok(())
}
