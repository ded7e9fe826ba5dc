//! Tool Protocol Implementations
//!
//! This module provides concrete implementations of the [`ToolProtocol`] trait
//! for the transports this crate ships with.
//!
//! # Available Implementations
//!
//! - **CustomToolProtocol**: Direct Rust function calls (sync and async)
//! - **StdioClientProtocol**: Client for a tool server child process speaking
//!   the newline-delimited JSON protocol of [`crate::stdio_server`]
//!
//! # Usage Patterns
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use caravan::tool_protocol::ToolRegistry;
//! use caravan::tool_protocols::{CustomToolProtocol, StdioClientProtocol};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let mut registry = ToolRegistry::empty();
//! registry.add_protocol("local", Arc::new(CustomToolProtocol::new())).await?;
//! registry
//!     .add_protocol(
//!         "booking",
//!         Arc::new(StdioClientProtocol::new("cargo run --quiet --example travel_tool_server")),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::caravan::stdio_server::{StdioOp, StdioRequest, StdioResponse};
use crate::caravan::tool_protocol::{ToolError, ToolMetadata, ToolProtocol, ToolResult};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::error::Error;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex, RwLock};

/// Type alias for synchronous tool functions exposed via the custom protocol.
pub type ToolFunction =
    Arc<dyn Fn(JsonValue) -> Result<ToolResult, Box<dyn Error + Send + Sync>> + Send + Sync>;

/// Type alias for asynchronous tool functions exposed via the custom protocol.
pub type AsyncToolFunction = Arc<
    dyn Fn(
            JsonValue,
        ) -> std::pin::Pin<
            Box<
                dyn std::future::Future<Output = Result<ToolResult, Box<dyn Error + Send + Sync>>>
                    + Send,
            >,
        > + Send
        + Sync,
>;

/// Custom function-calling tool protocol
///
/// This protocol allows you to register Rust functions as tools that agents can use.
/// It's useful for quick prototyping and simple tool implementations.
///
/// # Example
///
/// ```rust,no_run
/// use caravan::tool_protocols::CustomToolProtocol;
/// use caravan::tool_protocol::{ToolMetadata, ToolParameter, ToolParameterType, ToolResult};
/// use std::sync::Arc;
///
/// # async {
/// let protocol = CustomToolProtocol::new();
///
/// // Register a synchronous tool
/// protocol.register_tool(
///     ToolMetadata::new("add", "Adds two numbers")
///         .with_parameter(ToolParameter::new("a", ToolParameterType::Number).required())
///         .with_parameter(ToolParameter::new("b", ToolParameterType::Number).required()),
///     Arc::new(|params| {
///         let a = params["a"].as_f64().unwrap_or(0.0);
///         let b = params["b"].as_f64().unwrap_or(0.0);
///         Ok(ToolResult::success(serde_json::json!({"result": a + b})))
///     }),
/// ).await;
/// # };
/// ```
pub struct CustomToolProtocol {
    tools: Arc<RwLock<HashMap<String, ToolMetadata>>>,
    sync_functions: Arc<RwLock<HashMap<String, ToolFunction>>>,
    async_functions: Arc<RwLock<HashMap<String, AsyncToolFunction>>>,
}

impl CustomToolProtocol {
    /// Create an empty protocol ready to accept new tool registrations.
    pub fn new() -> Self {
        Self {
            tools: Arc::new(RwLock::new(HashMap::new())),
            sync_functions: Arc::new(RwLock::new(HashMap::new())),
            async_functions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a synchronous tool function.
    ///
    /// Subsequent calls will overwrite any existing tool with the same name.
    pub async fn register_tool(&self, metadata: ToolMetadata, function: ToolFunction) {
        let name = metadata.name.clone();
        self.tools.write().await.insert(name.clone(), metadata);
        self.sync_functions.write().await.insert(name, function);
    }

    /// Register an asynchronous tool function.
    pub async fn register_async_tool(&self, metadata: ToolMetadata, function: AsyncToolFunction) {
        let name = metadata.name.clone();
        self.tools.write().await.insert(name.clone(), metadata);
        self.async_functions.write().await.insert(name, function);
    }

    /// Remove a tool from the protocol.
    pub async fn unregister_tool(&self, name: &str) {
        self.tools.write().await.remove(name);
        self.sync_functions.write().await.remove(name);
        self.async_functions.write().await.remove(name);
    }
}

impl Default for CustomToolProtocol {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolProtocol for CustomToolProtocol {
    async fn execute(
        &self,
        tool_name: &str,
        parameters: JsonValue,
    ) -> Result<ToolResult, Box<dyn Error + Send + Sync>> {
        // Try async functions first
        {
            let async_funcs = self.async_functions.read().await;
            if let Some(func) = async_funcs.get(tool_name) {
                let future = func(parameters);
                drop(async_funcs);
                return future.await;
            }
        }

        // Then try sync functions
        {
            let sync_funcs = self.sync_functions.read().await;
            if let Some(func) = sync_funcs.get(tool_name) {
                return func(parameters);
            }
        }

        Err(Box::new(ToolError::NotFound(tool_name.to_string())))
    }

    async fn list_tools(&self) -> Result<Vec<ToolMetadata>, Box<dyn Error + Send + Sync>> {
        let tools = self.tools.read().await;
        Ok(tools.values().cloned().collect())
    }

    async fn get_tool_metadata(
        &self,
        tool_name: &str,
    ) -> Result<ToolMetadata, Box<dyn Error + Send + Sync>> {
        let tools = self.tools.read().await;
        tools.get(tool_name).cloned().ok_or_else(|| {
            Box::new(ToolError::NotFound(tool_name.to_string())) as Box<dyn Error + Send + Sync>
        })
    }

    fn protocol_name(&self) -> &str {
        "custom"
    }
}

/// Handles to a running tool-server child process.
struct StdioChild {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

/// Stdio tool-server client protocol
///
/// Spawns a tool server as a child process and speaks the newline-delimited
/// JSON protocol of [`crate::stdio_server`] over its stdin/stdout. The server
/// process is started lazily on first use and killed on
/// [`shutdown`](ToolProtocol::shutdown) (or when the protocol is dropped).
///
/// Wire access is serialized behind a mutex — one request/response exchange at
/// a time — which matches the single-threaded contract of the server side.
///
/// # Example
///
/// ```rust,no_run
/// use caravan::tool_protocols::StdioClientProtocol;
/// use caravan::tool_protocol::ToolProtocol;
///
/// # async {
/// let protocol = StdioClientProtocol::new("cargo run --quiet --example travel_tool_server")
///     .with_timeout(30);
/// let tools = protocol.list_tools().await.unwrap();
/// for tool in &tools {
///     println!("{}: {}", tool.name, tool.description);
/// }
/// # };
/// ```
pub struct StdioClientProtocol {
    /// Whitespace-separated command line used to spawn the server.
    command: String,
    /// Per-exchange timeout.
    timeout: Duration,
    /// Running child process, spawned lazily.
    child: Mutex<Option<StdioChild>>,
    /// Monotonically increasing request correlation id.
    next_id: AtomicU64,
    /// Cached tool metadata from the last successful listing.
    tools_cache: RwLock<Option<Vec<ToolMetadata>>>,
}

impl StdioClientProtocol {
    /// Create a client that spawns `command` (whitespace-separated program +
    /// arguments) as the tool-server child process.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: Duration::from_secs(30),
            child: Mutex::new(None),
            next_id: AtomicU64::new(1),
            tools_cache: RwLock::new(None),
        }
    }

    /// Override the default 30 second per-exchange timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout = Duration::from_secs(timeout_secs);
        self
    }

    /// Spawn the server process if it is not already running.
    async fn ensure_started(
        &self,
        guard: &mut Option<StdioChild>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        if guard.is_some() {
            return Ok(());
        }

        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            Box::new(ToolError::ProtocolError("Empty server command".to_string()))
                as Box<dyn Error + Send + Sync>
        })?;

        log::info!(
            "StdioClientProtocol: spawning tool server: {}",
            self.command
        );

        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Box::new(ToolError::ProtocolError(format!(
                    "Failed to spawn '{}': {}",
                    self.command, e
                ))) as Box<dyn Error + Send + Sync>
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            Box::new(ToolError::ProtocolError(
                "Tool server stdin unavailable".to_string(),
            )) as Box<dyn Error + Send + Sync>
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            Box::new(ToolError::ProtocolError(
                "Tool server stdout unavailable".to_string(),
            )) as Box<dyn Error + Send + Sync>
        })?;

        *guard = Some(StdioChild {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        });
        Ok(())
    }

    /// Perform one request/response exchange with the server.
    async fn round_trip(&self, op: StdioOp) -> Result<StdioResponse, Box<dyn Error + Send + Sync>> {
        let mut guard = self.child.lock().await;
        self.ensure_started(&mut guard).await?;
        let child = guard.as_mut().expect("child spawned above");

        let request = StdioRequest {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            op,
        };
        let mut encoded = serde_json::to_string(&request)?;
        encoded.push('\n');

        child.stdin.write_all(encoded.as_bytes()).await?;
        child.stdin.flush().await?;

        let line = tokio::time::timeout(self.timeout, child.stdout.next_line())
            .await
            .map_err(|_| {
                Box::new(ToolError::ProtocolError(format!(
                    "Tool server did not answer within {:?}",
                    self.timeout
                ))) as Box<dyn Error + Send + Sync>
            })??
            .ok_or_else(|| {
                Box::new(ToolError::ProtocolError(
                    "Tool server closed its stdout".to_string(),
                )) as Box<dyn Error + Send + Sync>
            })?;

        let response: StdioResponse = serde_json::from_str(&line).map_err(|e| {
            Box::new(ToolError::ProtocolError(format!(
                "Malformed server response: {}",
                e
            ))) as Box<dyn Error + Send + Sync>
        })?;

        if response.id != request.id {
            return Err(Box::new(ToolError::ProtocolError(format!(
                "Response id {} does not match request id {}",
                response.id, request.id
            ))));
        }

        Ok(response)
    }
}

#[async_trait]
impl ToolProtocol for StdioClientProtocol {
    async fn execute(
        &self,
        tool_name: &str,
        parameters: JsonValue,
    ) -> Result<ToolResult, Box<dyn Error + Send + Sync>> {
        let response = self
            .round_trip(StdioOp::Execute {
                tool: tool_name.to_string(),
                parameters,
            })
            .await?;

        if !response.ok {
            return Err(Box::new(ToolError::ExecutionFailed(
                response
                    .error
                    .unwrap_or_else(|| "Unknown server error".to_string()),
            )));
        }

        response.result.ok_or_else(|| {
            Box::new(ToolError::ProtocolError(
                "Server response carried no result".to_string(),
            )) as Box<dyn Error + Send + Sync>
        })
    }

    async fn list_tools(&self) -> Result<Vec<ToolMetadata>, Box<dyn Error + Send + Sync>> {
        let response = self.round_trip(StdioOp::ListTools).await?;

        if !response.ok {
            return Err(Box::new(ToolError::ProtocolError(
                response
                    .error
                    .unwrap_or_else(|| "Unknown server error".to_string()),
            )));
        }

        let tools = response.tools.ok_or_else(|| {
            Box::new(ToolError::ProtocolError(
                "Server response carried no tool listing".to_string(),
            )) as Box<dyn Error + Send + Sync>
        })?;

        *self.tools_cache.write().await = Some(tools.clone());
        Ok(tools)
    }

    async fn get_tool_metadata(
        &self,
        tool_name: &str,
    ) -> Result<ToolMetadata, Box<dyn Error + Send + Sync>> {
        // Serve from cache when possible to avoid a wire exchange per tool
        if let Some(cache) = self.tools_cache.read().await.as_ref() {
            if let Some(metadata) = cache.iter().find(|t| t.name == tool_name) {
                return Ok(metadata.clone());
            }
        }

        let tools = self.list_tools().await?;
        tools
            .into_iter()
            .find(|t| t.name == tool_name)
            .ok_or_else(|| {
                Box::new(ToolError::NotFound(tool_name.to_string())) as Box<dyn Error + Send + Sync>
            })
    }

    fn protocol_name(&self) -> &str {
        "stdio"
    }

    async fn shutdown(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut guard = self.child.lock().await;
        if let Some(mut child) = guard.take() {
            log::info!("StdioClientProtocol: stopping tool server");
            // Closing stdin lets the server exit on EOF; kill as a fallback.
            drop(child.stdin);
            if let Err(e) = child.child.kill().await {
                log::warn!("StdioClientProtocol: failed to kill tool server: {}", e);
            }
        }
        *self.tools_cache.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_protocol::{ToolParameter, ToolParameterType};

    #[tokio::test]
    async fn test_custom_protocol_sync_tool() {
        let protocol = CustomToolProtocol::new();
        protocol
            .register_tool(
                ToolMetadata::new("double", "Doubles a number")
                    .with_parameter(ToolParameter::new("n", ToolParameterType::Number).required()),
                Arc::new(|params| {
                    let n = params["n"].as_f64().unwrap_or(0.0);
                    Ok(ToolResult::success(serde_json::json!({ "result": n * 2.0 })))
                }),
            )
            .await;

        let result = protocol
            .execute("double", serde_json::json!({"n": 21}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output["result"], 42.0);
    }

    #[tokio::test]
    async fn test_custom_protocol_async_tool() {
        let protocol = CustomToolProtocol::new();
        protocol
            .register_async_tool(
                ToolMetadata::new("echo", "Echoes its input"),
                Arc::new(|params| {
                    Box::pin(async move { Ok(ToolResult::success(params)) })
                }),
            )
            .await;

        let result = protocol
            .execute("echo", serde_json::json!({"message": "hi"}))
            .await
            .unwrap();
        assert_eq!(result.output["message"], "hi");
    }

    #[tokio::test]
    async fn test_custom_protocol_unknown_tool() {
        let protocol = CustomToolProtocol::new();
        let err = protocol
            .execute("missing", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Tool not found"));
    }

    #[tokio::test]
    async fn test_custom_protocol_unregister() {
        let protocol = CustomToolProtocol::new();
        protocol
            .register_tool(
                ToolMetadata::new("temp", "Temporary"),
                Arc::new(|_| Ok(ToolResult::success(serde_json::Value::Null))),
            )
            .await;
        assert_eq!(protocol.list_tools().await.unwrap().len(), 1);

        protocol.unregister_tool("temp").await;
        assert!(protocol.list_tools().await.unwrap().is_empty());
    }
}
