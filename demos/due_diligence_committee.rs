//! Example: Hybrid team architecture — startup due diligence.
//!
//! Demonstrates parallel execution within a sub-team combined with sequential
//! coordination at the main team level:
//!
//! ```text
//! Due Diligence Committee (coordinate mode)
//!   ├─ Technical Assessment Team (broadcast mode — runs in parallel)
//!   │    ├─ Backend Architect
//!   │    ├─ Frontend Architect
//!   │    └─ Infrastructure Architect
//!   └─ Business Analyst
//! ```
//!
//! # Usage
//!
//! ```bash
//! TAVILY_API_KEY=tvly-... \
//! MODEL_PROVIDER=openai OPENAI_MODEL_ID=gpt-4.1-mini OPENAI_API_KEY=sk-... \
//!     cargo run --example due_diligence_committee
//! ```

use std::sync::Arc;

use caravan::event::ConsoleEventHandler;
use caravan::model_factory::ModelFactory;
use caravan::team::{Team, TeamMode};
use caravan::tool_protocol::ToolRegistry;
use caravan::tools::WebSearchTool;
use caravan::Agent;
use tokio::sync::RwLock;

fn architect(
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

    println!("Hybrid Team Demo: Startup Due Diligence");
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

    // Technical assessment sub-team: all three architects assess in parallel.
    let mut technical_team = Team::new("technical-team", "Technical Assessment Team")
        .with_mode(TeamMode::Broadcast)
        .with_description(
            "Technical experts assess different aspects of the tech stack in parallel.",
        )
        .with_instruction("Each architect independently assesses their domain.")
        .with_instruction("Provide comprehensive technical evaluation from your perspective.")
        .with_coordinator(ModelFactory::create_client()?);

    technical_team.add_member(architect(
        "backend",
        "Backend Architect",
        "Assess backend architecture, scalability, and technical debt",
        "Evaluate the startup's backend technical stack:\n\
         - Architecture design and scalability\n\
         - Database design and data management\n\
         - API design and microservices\n\
         - Code quality and technical debt\n\
         - Security practices\n\n\
         Provide technical assessment with specific findings and recommendations.",
        tools.clone(),
    )?)?;

    technical_team.add_member(architect(
        "frontend",
        "Frontend Architect",
        "Assess frontend architecture, UX, and performance",
        "Evaluate the startup's frontend technical stack:\n\
         - Frontend framework and architecture\n\
         - User experience and interface design\n\
         - Performance and loading times\n\
         - Accessibility standards\n\n\
         Provide frontend assessment with specific findings and recommendations.",
        tools.clone(),
    )?)?;

    technical_team.add_member(architect(
        "infrastructure",
        "Infrastructure Architect",
        "Assess infrastructure, DevOps, and operational practices",
        "Evaluate the startup's infrastructure and operations:\n\
         - Cloud infrastructure and architecture\n\
         - DevOps practices and CI/CD pipelines\n\
         - Monitoring and observability\n\
         - Cost optimization\n\n\
         Provide infrastructure assessment with specific findings and recommendations.",
        tools.clone(),
    )?)?;

    // Main committee: the technical sub-team first, then the business analyst.
    let mut committee = Team::new("committee", "Due Diligence Committee")
        .with_mode(TeamMode::Coordinate)
        .with_description(
            "Main committee coordinating technical assessment sub-team and business analysis.",
        )
        .with_instruction("1. The Technical Assessment Team evaluates the tech stack in parallel")
        .with_instruction("2. The Business Analyst assesses business viability")
        .with_instruction("3. Synthesize all assessments into an investment decision")
        .with_instruction(
            "Output structure: Technical Assessment Summary, Business Assessment, \
             Overall Risk Analysis, Investment Recommendation \
             (Invest/Pass/Further Investigation), Key Decision Factors",
        )
        .with_coordinator(ModelFactory::create_client()?)
        .share_member_interactions(true)
        .with_event_handler(Arc::new(ConsoleEventHandler));

    committee.add_subteam(technical_team)?;
    committee.add_member(architect(
        "business",
        "Business Analyst",
        "Assess business model, market fit, and growth potential",
        "Evaluate the startup's business viability:\n\
         - Business model and revenue streams\n\
         - Market opportunity and competition\n\
         - Product-market fit\n\
         - Growth trajectory and metrics\n\
         - Financial sustainability\n\n\
         Provide business assessment with market analysis and growth potential.",
        tools,
    )?)?;

    let request = "We're considering a $5M Series A investment in a SaaS startup. \
        The company is TechFlow, an AI-powered project management tool with 10K users. \
        Conduct comprehensive due diligence: technical assessment and business viability. \
        Tech stack: Python/FastAPI backend, React frontend, AWS infrastructure.";

    println!("\nRequest: {}\n{}", request, "-".repeat(60));

    let response = committee.run(request).await?;

    for msg in &response.messages {
        let who = msg.member_name.as_deref().unwrap_or("Committee");
        println!("\n[{}]\n{}", who, msg.content);
    }
    println!(
        "\nCommittee run complete: {} | tokens: {}",
        response.is_complete, response.total_tokens_used
    );

    Ok(())
}
