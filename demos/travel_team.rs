//! Example: Team-based travel planning over a custom booking tool server.
//!
//! Two specialist agents — flights and hotels — share one connection to the
//! travel booking server, which runs as a child process speaking the stdio
//! tool protocol. A coordinating team engages the specialists in sequence and
//! synthesizes a complete travel plan.
//!
//! # Architecture
//!
//! ```text
//! Travel Planning Team (coordinate mode)
//!   ├─ Flight Specialist ─┐
//!   ├─ Hotel Specialist ──┼─ shared ToolRegistry
//!   └─ coordinator model  │     └─ protocol "booking" (StdioClientProtocol)
//!                         │           └─ child process: travel_tool_server
//! ```
//!
//! # Usage
//!
//! Build the tool server first so the child process starts quickly, then run
//! with your provider configuration:
//!
//! ```bash
//! cargo build --example travel_tool_server
//! MODEL_PROVIDER=ollama OLLAMA_MODEL_ID=qwen3:8b OLLAMA_TEMPERATURE=0.2 \
//!     cargo run --example travel_team
//! ```

use std::sync::Arc;

use caravan::event::ConsoleEventHandler;
use caravan::model_factory::ModelFactory;
use caravan::team::{Team, TeamMode};
use caravan::tool_protocol::ToolRegistry;
use caravan::tool_protocols::StdioClientProtocol;
use caravan::Agent;
use tokio::sync::RwLock;

const SERVER_COMMAND: &str = "cargo run --quiet --example travel_tool_server";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    caravan::init_logger();

    println!("Tunisia Travel Planning Team Demo with Custom Tool Server");
    let provider = ModelFactory::provider()?;
    println!("Using {}", provider.as_str().to_uppercase());
    println!("{}", "=".repeat(65));

    // Keep one booking-server connection alive for the entire team run.
    // The child process is spawned lazily on the first tool listing.
    let booking = Arc::new(StdioClientProtocol::new(SERVER_COMMAND).with_timeout(30));

    let mut registry = ToolRegistry::empty();
    registry.add_protocol("booking", booking).await?;
    println!("Booking tools available:");
    for tool in registry.list_tools() {
        println!("  - {}: {}", tool.name, tool.description);
    }
    let shared_tools = Arc::new(RwLock::new(registry));

    let flight_specialist = Agent::new(
        "flight-specialist",
        "Flight Specialist",
        ModelFactory::create_client()?,
    )
    .with_expertise("Find flight options using the custom booking system")
    .with_instructions(
        "You find flights from London to Tunisia using the search_flights tool.\n\
         Focus on airlines like Tunisair, British Airways, EasyJet, and Ryanair \
         with prices in British Pounds (£).\n\n\
         YOU MUST ONLY PROVIDE FLIGHT INFORMATION.\n\
         Do NOT provide hotel information.",
    )
    .with_shared_tools(shared_tools.clone());

    let hotel_specialist = Agent::new(
        "hotel-specialist",
        "Hotel Specialist",
        ModelFactory::create_client()?,
    )
    .with_expertise("Find hotel options using the custom booking system")
    .with_instructions(
        "You find Tunisian hotels using the search_hotels tool.\n\
         Focus on hotels in Tunisia with prices in British Pounds (£) and local \
         amenities.\n\n\
         YOU MUST ONLY PROVIDE HOTEL INFORMATION.\n\
         Do NOT provide flight information.",
    )
    .with_shared_tools(shared_tools.clone());

    let mut travel_team = Team::new("travel-team", "Travel Planning Team")
        .with_mode(TeamMode::Coordinate)
        .with_description("Coordinate Tunisia travel booking using custom travel systems.")
        .with_instruction("1. Ask the Flight Specialist to find flights from London to Tunisia")
        .with_instruction("2. Ask the Hotel Specialist to find hotels in Tunisia")
        .with_instruction("3. Present a complete travel plan with costs in British Pounds (£)")
        .with_coordinator(ModelFactory::create_client()?)
        .share_member_interactions(true)
        .with_event_handler(Arc::new(ConsoleEventHandler));

    travel_team.add_member(flight_specialist)?;
    travel_team.add_member(hotel_specialist)?;

    let travel_request = "Plan a 5-day trip to Tunisia from London. \
        Departure March 15th, return March 20th. \
        Budget is £2000 total. \
        Interested in traditional Tunisian culture, beaches, desert experiences, \
        and local cuisine. \
        Prefer destinations like Tunis, Djerba, Monastir, or Tozeur.";

    println!("\nTravel Request: {}", travel_request);
    println!("{}", "-".repeat(65));

    let response = travel_team.run(travel_request).await?;

    println!("\n{}", "=".repeat(65));
    for msg in &response.messages {
        let who = msg.member_name.as_deref().unwrap_or("Coordinator");
        println!("\n[{}]\n{}", who, msg.content);
    }

    println!("\n{}", "=".repeat(65));
    println!(
        "Run {} finished | complete: {} | tokens: {}",
        response.run_id, response.is_complete, response.total_tokens_used
    );

    Ok(())
}
