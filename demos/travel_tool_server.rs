//! Travel booking tool server.
//!
//! Serves the travel lookup service (`search_flights`, `search_hotels`) to an
//! external agent runtime over the stdio tool-call protocol. This is the
//! process that `travel_team` spawns as its booking backend.
//!
//! Run standalone to poke at the wire by hand:
//!
//! ```bash
//! cargo run --example travel_tool_server
//! {"id":1,"op":"list_tools"}
//! {"id":2,"op":"execute","tool":"search_flights","parameters":{"destination":"Tunis","budget":200}}
//! ```
//!
//! Diagnostics go to stderr (enable with `RUST_LOG=info`); stdout carries
//! only protocol responses.

use std::sync::Arc;

use caravan::stdio_server::StdioToolServer;
use caravan::travel::TravelToolProtocol;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    caravan::init_logger();
    log::info!("Starting travel booking tool server on stdio...");

    let mut server = StdioToolServer::new();
    server
        .register_protocol(Arc::new(TravelToolProtocol::new()))
        .await?;

    server.serve().await?;
    Ok(())
}
