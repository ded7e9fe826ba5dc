//! Example: Investment strategy team — analyzing an NVIDIA investment decision.
//!
//! Four specialist analysts share a web search tool and are engaged in
//! sequence by a coordinating team, which synthesizes their findings into a
//! Buy/Hold/Sell recommendation.
//!
//! # Usage
//!
//! ```bash
//! TAVILY_API_KEY=tvly-... \
//! MODEL_PROVIDER=openai OPENAI_MODEL_ID=gpt-4.1-mini OPENAI_API_KEY=sk-... \
//!     cargo run --example investment_team
//! ```

use std::sync::Arc;

use caravan::event::ConsoleEventHandler;
use caravan::model_factory::ModelFactory;
use caravan::team::{Team, TeamMode};
use caravan::tool_protocol::ToolRegistry;
use caravan::tools::WebSearchTool;
use caravan::Agent;
use tokio::sync::RwLock;

/// Build an analyst wired to the shared web search registry.
fn analyst(
    id: &str,
    name: &str,
    expertise: &str,
    instructions: &str,
    tools: Arc<RwLock<ToolRegistry>>,
) -> Result<Agent, Box<dyn std::error::Error + Send + Sync>> {
    Ok(Agent::new(id, name, ModelFactory::create_client()?)
        .with_expertise(expertise)
        .with_instructions(instructions)
        .with_shared_tools(tools))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    caravan::init_logger();

    println!("Investment Strategy Team Demo");
    println!("{}", "=".repeat(60));

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
    let tools = Arc::new(RwLock::new(registry));

    let mut investment_team = Team::new("investment-team", "Investment Strategy Coordinator")
        .with_mode(TeamMode::Coordinate)
        .with_description(
            "Coordinate comprehensive investment analysis across four specialized analysts.",
        )
        .with_instruction("1. Financial Analyst assesses financial fundamentals")
        .with_instruction("2. Market Analyst evaluates competitive position")
        .with_instruction("3. Technology Analyst assesses innovation and technology moat")
        .with_instruction("4. Risk Analyst identifies potential downsides")
        .with_instruction(
            "5. Synthesize all analyses into a comprehensive investment recommendation \
             (Buy/Hold/Sell) with rationale",
        )
        .with_coordinator(ModelFactory::create_client()?)
        .share_member_interactions(true)
        .with_event_handler(Arc::new(ConsoleEventHandler));

    investment_team.add_member(analyst(
        "financial",
        "Financial Analyst",
        "Analyze financial metrics, revenue, profitability, and financial health",
        "Analyze NVIDIA's financial fundamentals:\n\
         - Revenue growth trends and projections\n\
         - Profitability metrics (margins, EPS, ROE)\n\
         - Balance sheet strength (debt, cash position)\n\
         - Valuation metrics (P/E, P/S, PEG ratios)\n\
         - Recent earnings reports and guidance\n\n\
         Provide quantitative analysis with specific metrics and comparisons to \
         industry peers. Focus on financial health and growth sustainability.",
        tools.clone(),
    )?)?;

    investment_team.add_member(analyst(
        "market",
        "Market Analyst",
        "Analyze market position, competition, and industry trends",
        "Evaluate NVIDIA's market position:\n\
         - Market share in key segments (AI chips, data center, gaming)\n\
         - Competitive landscape (AMD, Intel, custom chips)\n\
         - Industry trends (AI adoption, data center growth, gaming market)\n\
         - Competitive advantages and moats\n\n\
         Assess competitive positioning and market dynamics.",
        tools.clone(),
    )?)?;

    investment_team.add_member(analyst(
        "technology",
        "Technology Analyst",
        "Analyze technology trends, innovation, and product pipeline",
        "Evaluate NVIDIA's technology and innovation:\n\
         - Product pipeline and roadmap\n\
         - R&D investments and innovation capabilities\n\
         - Technology leadership and patents\n\
         - Partnerships and ecosystem (CUDA, AI frameworks)\n\n\
         Assess technological moat and innovation trajectory.",
        tools.clone(),
    )?)?;

    investment_team.add_member(analyst(
        "risk",
        "Risk Analyst",
        "Identify risks, challenges, and potential downsides",
        "Identify investment risks and challenges:\n\
         - Regulatory risks (export controls, trade restrictions)\n\
         - Market risks (cyclicality, demand fluctuations)\n\
         - Competitive risks (new entrants, technology shifts)\n\
         - Valuation risks (overvaluation, market sentiment)\n\n\
         Provide balanced risk assessment with probability and impact analysis.",
        tools,
    )?)?;

    let request = "Should we invest in NVIDIA? Analyze the investment opportunity \
        comprehensively. Consider a $100,000 investment with a horizon of 2-3 years.";

    println!("\nRequest: {}\n{}", request, "-".repeat(60));

    let response = investment_team.run(request).await?;

    if let Some(answer) = &response.final_answer {
        println!("\n{}\nINVESTMENT RECOMMENDATION\n{}\n{}", "=".repeat(60), "=".repeat(60), answer);
    }
    println!(
        "\nTokens used across the team: {}",
        response.total_tokens_used
    );

    Ok(())
}
