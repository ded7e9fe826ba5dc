//! Stdio Tool Server
//!
//! This module provides a concrete tool server that aggregates multiple tools
//! and serves them to an external agent runtime over a newline-delimited JSON
//! protocol on stdin/stdout.
//!
//! The server acts as a dispatcher: tool calls are routed to the appropriate
//! underlying [`ToolProtocol`] implementation by tool name, so a single child
//! process can expose a unified set of tools through one wire.
//!
//! # Architecture
//!
//! ```text
//! Multiple Tools (TravelToolProtocol, CustomToolProtocol, ...)
//!         ↓
//! StdioToolServer (implements ToolProtocol)
//!         ↓
//! stdin/stdout (one JSON request/response per line)
//!         ↓
//! Agent runtime (via StdioClientProtocol)
//! ```
//!
//! # Wire format
//!
//! Requests:
//!
//! ```text
//! {"id":1,"op":"list_tools"}
//! {"id":2,"op":"execute","tool":"search_flights","parameters":{"destination":"Tunis"}}
//! ```
//!
//! Responses:
//!
//! ```text
//! {"id":1,"ok":true,"tools":[...]}
//! {"id":2,"ok":true,"result":{"success":true,"output":"...","error":null,"metadata":{}}}
//! {"id":3,"ok":false,"error":"Tool not found: teleport"}
//! ```
//!
//! Malformed lines are answered with `ok: false` and the server keeps serving;
//! EOF on the reader terminates the loop cleanly. Diagnostics go to stderr via
//! the `log` facade so stdout stays a clean wire.
//!
//! # Example
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

use crate::caravan::tool_protocol::{ToolError, ToolMetadata, ToolProtocol, ToolResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;

/// Operations understood by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StdioOp {
    /// List the metadata of every tool the server exposes.
    ListTools,
    /// Execute a named tool with JSON parameters.
    Execute {
        tool: String,
        #[serde(default)]
        parameters: serde_json::Value,
    },
}

/// A single request line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StdioRequest {
    /// Caller-chosen correlation id, echoed back in the response.
    pub id: u64,
    #[serde(flatten)]
    pub op: StdioOp,
}

/// A single response line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StdioResponse {
    /// Correlation id of the request this answers (0 when the request id
    /// could not be parsed).
    pub id: u64,
    /// Whether the operation succeeded at the protocol level.
    pub ok: bool,
    /// Tool listing, present for successful `list_tools` responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolMetadata>>,
    /// Tool result, present for successful `execute` responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolResult>,
    /// Error description, present when `ok` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StdioResponse {
    fn tools(id: u64, tools: Vec<ToolMetadata>) -> Self {
        Self {
            id,
            ok: true,
            tools: Some(tools),
            result: None,
            error: None,
        }
    }

    fn result(id: u64, result: ToolResult) -> Self {
        Self {
            id,
            ok: true,
            tools: None,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: u64, error: impl Into<String>) -> Self {
        Self {
            id,
            ok: false,
            tools: None,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// A tool server that aggregates multiple tool protocols behind one stdio wire.
///
/// The server also implements [`ToolProtocol`] itself, so the same aggregate
/// can be embedded in-process (e.g. handed straight to a
/// [`ToolRegistry`](crate::tool_protocol::ToolRegistry)) or served to a child
/// process boundary with [`serve`](StdioToolServer::serve).
///
/// # Thread Safety
///
/// The server is thread-safe and can be shared across multiple concurrent tool
/// executions using `Arc<StdioToolServer>`.
#[derive(Clone)]
pub struct StdioToolServer {
    /// Map of tool name to the protocol that owns it.
    tools: Arc<RwLock<HashMap<String, Arc<dyn ToolProtocol>>>>,
}

impl StdioToolServer {
    /// Create a new empty server.
    pub fn new() -> Self {
        Self {
            tools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register every tool a protocol exposes.
    ///
    /// The protocol is asked for its tool metadata and each discovered tool
    /// name is routed to it. Later registrations win on name collisions.
    pub async fn register_protocol(
        &mut self,
        protocol: Arc<dyn ToolProtocol>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let discovered = protocol.list_tools().await?;
        let mut tools = self.tools.write().await;
        for metadata in discovered {
            tools.insert(metadata.name, protocol.clone());
        }
        Ok(())
    }

    /// Register a single tool name against a protocol.
    pub async fn register_tool(&mut self, tool_name: &str, protocol: Arc<dyn ToolProtocol>) {
        let mut tools = self.tools.write().await;
        tools.insert(tool_name.to_string(), protocol);
    }

    /// Remove a tool from the server.
    pub async fn unregister_tool(&mut self, tool_name: &str) {
        let mut tools = self.tools.write().await;
        tools.remove(tool_name);
    }

    /// Check if a tool is registered.
    pub async fn has_tool(&self, tool_name: &str) -> bool {
        let tools = self.tools.read().await;
        tools.contains_key(tool_name)
    }

    /// Get the number of registered tools.
    pub async fn tool_count(&self) -> usize {
        let tools = self.tools.read().await;
        tools.len()
    }

    /// Serve requests on the process's stdin/stdout until EOF.
    pub async fn serve(&self) -> io::Result<()> {
        log::info!("StdioToolServer::serve(): serving tools on stdio");
        self.serve_with(io::stdin(), io::stdout()).await
    }

    /// Serve requests on an arbitrary reader/writer pair until EOF.
    ///
    /// One request per line in, one response per line out. Used directly by
    /// tests over an in-memory duplex pipe.
    pub async fn serve_with<R, W>(&self, reader: R, mut writer: W) -> io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let response = self.handle_line(&line).await;
            let mut encoded = serde_json::to_string(&response)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            encoded.push('\n');
            writer.write_all(encoded.as_bytes()).await?;
            writer.flush().await?;
        }

        log::info!("StdioToolServer::serve_with(): reader closed, shutting down");
        Ok(())
    }

    /// Parse and dispatch one request line, always producing a response.
    async fn handle_line(&self, line: &str) -> StdioResponse {
        let request: StdioRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("StdioToolServer: malformed request line: {}", e);
                // Salvage the id when the line is valid JSON with a numeric id
                let id = serde_json::from_str::<serde_json::Value>(line)
                    .ok()
                    .and_then(|v| v.get("id").and_then(|id| id.as_u64()))
                    .unwrap_or(0);
                return StdioResponse::error(id, format!("Malformed request: {}", e));
            }
        };

        match request.op {
            StdioOp::ListTools => match self.list_tools().await {
                Ok(tools) => StdioResponse::tools(request.id, tools),
                Err(e) => StdioResponse::error(request.id, e.to_string()),
            },
            StdioOp::Execute { tool, parameters } => {
                log::info!("StdioToolServer: execute '{}'", tool);
                match self.execute(&tool, parameters).await {
                    Ok(result) => StdioResponse::result(request.id, result),
                    Err(e) => StdioResponse::error(request.id, e.to_string()),
                }
            }
        }
    }
}

impl Default for StdioToolServer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolProtocol for StdioToolServer {
    /// Execute a tool by routing to the protocol registered for its name.
    async fn execute(
        &self,
        tool_name: &str,
        parameters: serde_json::Value,
    ) -> Result<ToolResult, Box<dyn Error + Send + Sync>> {
        let tools = self.tools.read().await;

        let protocol = tools.get(tool_name).cloned().ok_or_else(|| {
            Box::new(ToolError::NotFound(tool_name.to_string())) as Box<dyn Error + Send + Sync>
        })?;

        // Drop the read lock before executing to allow concurrent access
        drop(tools);

        protocol.execute(tool_name, parameters).await
    }

    /// List all available tools across all registered protocols.
    async fn list_tools(&self) -> Result<Vec<ToolMetadata>, Box<dyn Error + Send + Sync>> {
        let tools = self.tools.read().await;
        let entries: Vec<(String, Arc<dyn ToolProtocol>)> = tools
            .iter()
            .map(|(name, protocol)| (name.clone(), protocol.clone()))
            .collect();

        // Drop the read lock before making async calls
        drop(tools);

        let mut all_tools = Vec::new();
        for (name, protocol) in entries {
            match protocol.get_tool_metadata(&name).await {
                Ok(metadata) => all_tools.push(metadata),
                Err(e) => {
                    log::error!("StdioToolServer: error describing tool '{}': {}", name, e);
                }
            }
        }

        // HashMap iteration order is arbitrary; keep listings stable
        all_tools.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all_tools)
    }

    fn protocol_name(&self) -> &str {
        "stdio-tool-server"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockToolProtocol {
        name: String,
    }

    #[async_trait]
    impl ToolProtocol for MockToolProtocol {
        async fn execute(
            &self,
            tool_name: &str,
            _parameters: serde_json::Value,
        ) -> Result<ToolResult, Box<dyn Error + Send + Sync>> {
            Ok(ToolResult::success(serde_json::json!({
                "tool": tool_name,
                "source": &self.name
            })))
        }

        async fn list_tools(&self) -> Result<Vec<ToolMetadata>, Box<dyn Error + Send + Sync>> {
            Ok(vec![ToolMetadata::new(&self.name, "A mock tool")])
        }

        fn protocol_name(&self) -> &str {
            "mock"
        }
    }

    #[tokio::test]
    async fn test_server_creation() {
        let server = StdioToolServer::new();
        assert_eq!(server.tool_count().await, 0);
        assert_eq!(server.protocol_name(), "stdio-tool-server");
    }

    #[tokio::test]
    async fn test_register_protocol_discovers_tools() {
        let mut server = StdioToolServer::new();
        server
            .register_protocol(Arc::new(MockToolProtocol {
                name: "mock_tool".to_string(),
            }))
            .await
            .unwrap();

        assert_eq!(server.tool_count().await, 1);
        assert!(server.has_tool("mock_tool").await);
    }

    #[tokio::test]
    async fn test_execute_routing() {
        let mut server = StdioToolServer::new();
        server
            .register_tool(
                "router_test",
                Arc::new(MockToolProtocol {
                    name: "router_test".to_string(),
                }),
            )
            .await;

        let result = server
            .execute("router_test", serde_json::json!({}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output["tool"], "router_test");
    }

    #[tokio::test]
    async fn test_execute_nonexistent_tool() {
        let server = StdioToolServer::new();
        let result = server.execute("nonexistent", serde_json::json!({})).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_unregister_tool() {
        let mut server = StdioToolServer::new();
        server
            .register_tool(
                "temp_tool",
                Arc::new(MockToolProtocol {
                    name: "temp_tool".to_string(),
                }),
            )
            .await;
        assert_eq!(server.tool_count().await, 1);

        server.unregister_tool("temp_tool").await;
        assert_eq!(server.tool_count().await, 0);
    }

    #[test]
    fn test_request_wire_format() {
        let request: StdioRequest =
            serde_json::from_str(r#"{"id":7,"op":"execute","tool":"search_flights","parameters":{"destination":"Tunis"}}"#)
                .unwrap();
        assert_eq!(request.id, 7);
        match request.op {
            StdioOp::Execute { tool, parameters } => {
                assert_eq!(tool, "search_flights");
                assert_eq!(parameters["destination"], "Tunis");
            }
            _ => panic!("expected execute op"),
        }

        let listing: StdioRequest = serde_json::from_str(r#"{"id":1,"op":"list_tools"}"#).unwrap();
        assert!(matches!(listing.op, StdioOp::ListTools));
    }
}
