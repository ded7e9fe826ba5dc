//! Example: ReAct agent for multi-step research and report generation.
//!
//! Demonstrates iterative reasoning: Think → Act → Observe → Think → Act...
//! The agent researches ENIT (École Nationale d'Ingénieurs de Tunis) across
//! three pillars, each backed by a scoped web-search tool, then compiles a
//! report.
//!
//! # Usage
//!
//! ```bash
//! TAVILY_API_KEY=tvly-... \
//! MODEL_PROVIDER=openai OPENAI_MODEL_ID=gpt-4.1-mini OPENAI_API_KEY=sk-... \
//!     cargo run --example react_research
//! ```

use std::sync::Arc;

use caravan::event::ConsoleEventHandler;
use caravan::model_factory::ModelFactory;
use caravan::react::ReactAgent;
use caravan::tool_protocol::{ToolMetadata, ToolParameter, ToolParameterType, ToolRegistry, ToolResult};
use caravan::tool_protocols::CustomToolProtocol;
use caravan::tools::WebSearchTool;

/// Register a search tool that scopes every query to one research pillar.
async fn register_scoped_search(
    protocol: &CustomToolProtocol,
    search: Arc<WebSearchTool>,
    tool_name: &str,
    description: &str,
    query_suffix: &'static str,
) {
    protocol
        .register_async_tool(
            ToolMetadata::new(tool_name, description).with_parameter(
                ToolParameter::new("query", ToolParameterType::String)
                    .with_description("Specific search query for this pillar")
                    .required(),
            ),
            Arc::new(move |params| {
                let search = search.clone();
                Box::pin(async move {
                    let query = params.get("query").and_then(|v| v.as_str()).unwrap_or("");
                    let scoped = format!("ENIT Tunis {} {}", query, query_suffix);
                    match search.search(&scoped).await {
                        Ok(report) => Ok(ToolResult::success(serde_json::Value::String(report))),
                        Err(e) => Ok(ToolResult::failure(e.to_string())),
                    }
                })
            }),
        )
        .await;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    caravan::init_logger();

    let provider = ModelFactory::provider()?;
    println!("{}", "=".repeat(100));
    println!("ReAct-Style Agent: ENIT University Research Report");
    println!("Provider: {}", provider.as_str().to_uppercase());
    println!("{}", "=".repeat(100));

    let search = Arc::new(
        WebSearchTool::from_env()?
            .with_search_depth("advanced")
            .with_max_results(5),
    );

    let protocol = CustomToolProtocol::new();
    register_scoped_search(
        &protocol,
        search.clone(),
        "search_academic_programs",
        "Search for information about ENIT's academic programs",
        "academic programs engineering specializations",
    )
    .await;
    register_scoped_search(
        &protocol,
        search.clone(),
        "search_research_innovation",
        "Search for information about ENIT's research and innovation activities",
        "research innovation projects laboratories",
    )
    .await;
    register_scoped_search(
        &protocol,
        search,
        "search_rankings_reputation",
        "Search for information about ENIT's rankings and reputation",
        "rankings reputation international standing",
    )
    .await;

    let mut registry = ToolRegistry::empty();
    registry.add_protocol("research", Arc::new(protocol)).await?;

    let agent = ReactAgent::new(
        "enit-researcher",
        "Research Agent",
        ModelFactory::create_client()?,
        registry,
    )
    .with_system_prompt(
        "You are a research agent.\n\n\
         Research workflow - work through ONE pillar at a time:\n\
         1. First use search_academic_programs to research Academic Programs\n\
         2. After the observation, use search_research_innovation for Research & Innovation\n\
         3. After the observation, use search_rankings_reputation for Rankings & Reputation\n\
         4. After all observations, compile the findings into a comprehensive report",
    )
    .with_max_steps(8)
    .with_event_handler(Arc::new(ConsoleEventHandler));

    let query = "Create a comprehensive report about ENIT \
        (École Nationale d'Ingénieurs de Tunis).\n\n\
        Research these three pillars:\n\
        1. Academic Programs - engineering programs and specializations\n\
        2. Research & Innovation - research strengths and notable projects\n\
        3. Rankings & Reputation - national and international standing\n\n\
        For each pillar, search for information, then move to the next. \
        Finally, compile all findings into a cohesive report with clear sections.";

    println!("\nTask: Research ENIT across 3 dimensions\n");
    println!("{}", "-".repeat(100));

    let outcome = agent.run(query).await?;

    for (i, step) in outcome.steps.iter().enumerate() {
        if let Some(action) = &step.action {
            println!(
                "\nStep {}: {} ({})",
                i + 1,
                action,
                step.thought.as_deref().unwrap_or("no stated thought")
            );
        }
    }

    println!("\n{}", "=".repeat(100));
    println!("FINAL RESPONSE (completed: {}):", outcome.completed);
    println!("{}", "=".repeat(100));
    println!("{}", outcome.answer);

    if let Some(usage) = outcome.tokens_used {
        println!("\nTokens: {} in / {} out", usage.input_tokens, usage.output_tokens);
    }

    Ok(())
}
