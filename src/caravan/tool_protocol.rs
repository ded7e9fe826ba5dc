//! Tool Protocol Abstraction Layer
//!
//! This module provides a flexible abstraction for connecting agents to various tool
//! transports. The same interface covers in-process Rust functions, the stdio tool
//! server of [`crate::stdio_server`], and any user-defined mechanism.
//!
//! # Architecture
//!
//! ```text
//! Agent → ToolRegistry → ToolProtocol (trait) → [Stdio | Custom | User-defined]
//! ```
//!
//! A [`ToolRegistry`] can hold several protocols at once, each registered under a
//! label. Tool names are discovered from each protocol and execution is routed to
//! whichever protocol owns the requested tool.
//!
//! # Example
//!
//! ```rust,no_run
//! use caravan::tool_protocol::{ToolParameter, ToolParameterType};
//!
//! // Define a tool parameter
//! let param = ToolParameter::new("destination", ToolParameterType::String)
//!     .with_description("Destination city to search flights for")
//!     .required();
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Represents the result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool execution was successful
    pub success: bool,
    /// The output data from the tool
    pub output: serde_json::Value,
    /// Optional error message if execution failed
    pub error: Option<String>,
    /// Metadata about the execution (timing, cost, etc.)
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ToolResult {
    /// Convenience constructor for successful tool execution.
    pub fn success(output: serde_json::Value) -> Self {
        Self {
            success: true,
            output,
            error: None,
            metadata: HashMap::new(),
        }
    }

    /// Convenience constructor for failed tool execution.
    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            output: serde_json::Value::Null,
            error: Some(error),
            metadata: HashMap::new(),
        }
    }

    /// Attach protocol or application specific metadata to the result.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Render the output as plain text.
    ///
    /// String outputs are returned verbatim; anything else is JSON-encoded.
    /// This is what agents see as the tool's observation.
    pub fn output_text(&self) -> String {
        match &self.output {
            serde_json::Value::String(text) => text.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| format!("{:?}", other)),
        }
    }
}

/// Defines the type of a tool parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ToolParameterType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

/// Defines a parameter for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ToolParameterType,
    pub description: Option<String>,
    pub required: bool,
    pub default: Option<serde_json::Value>,
}

impl ToolParameter {
    /// Define a new tool parameter with the provided name and type.
    pub fn new(name: impl Into<String>, param_type: ToolParameterType) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: None,
            required: false,
            default: None,
        }
    }

    /// Add a human readable description that will surface in generated schemas.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the argument as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Provide a default value that will be used when the LLM omits the parameter.
    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Metadata about a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolMetadata {
    /// Create metadata with the supplied identifier and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter definition to the tool metadata.
    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }
}

/// Trait for implementing tool execution protocols
#[async_trait]
pub trait ToolProtocol: Send + Sync {
    /// Execute a tool with the given parameters
    async fn execute(
        &self,
        tool_name: &str,
        parameters: serde_json::Value,
    ) -> Result<ToolResult, Box<dyn Error + Send + Sync>>;

    /// Get metadata about available tools
    async fn list_tools(&self) -> Result<Vec<ToolMetadata>, Box<dyn Error + Send + Sync>>;

    /// Get metadata about a specific tool
    async fn get_tool_metadata(
        &self,
        tool_name: &str,
    ) -> Result<ToolMetadata, Box<dyn Error + Send + Sync>> {
        let tools = self.list_tools().await?;
        tools
            .into_iter()
            .find(|t| t.name == tool_name)
            .ok_or_else(|| {
                Box::new(ToolError::NotFound(tool_name.to_string())) as Box<dyn Error + Send + Sync>
            })
    }

    /// Protocol identifier (e.g., "stdio", "custom")
    fn protocol_name(&self) -> &str;

    /// Cleanup/disconnect from the tool protocol
    async fn shutdown(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

/// Error types for tool operations
#[derive(Debug, Clone)]
pub enum ToolError {
    /// Requested tool is not registered in the current registry/protocol.
    NotFound(String),
    /// Tool execution completed with an application level failure.
    ExecutionFailed(String),
    /// The provided JSON parameters failed validation or deserialization.
    InvalidParameters(String),
    /// A lower level protocol/transport error occurred.
    ProtocolError(String),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::NotFound(name) => write!(f, "Tool not found: {}", name),
            ToolError::ExecutionFailed(msg) => write!(f, "Tool execution failed: {}", msg),
            ToolError::InvalidParameters(msg) => write!(f, "Invalid parameters: {}", msg),
            ToolError::ProtocolError(msg) => write!(f, "Protocol error: {}", msg),
        }
    }
}

impl Error for ToolError {}

/// A tool discovered from a protocol, kept alongside the label of the
/// protocol that owns it so execution can be routed.
#[derive(Clone)]
struct RegisteredTool {
    metadata: ToolMetadata,
    protocol_label: String,
}

/// Registry for managing the tools available to agents.
///
/// The registry supports multiple simultaneous protocols: each protocol is
/// registered under a label, its tools are discovered via
/// [`ToolProtocol::list_tools`], and execution requests are routed to the
/// protocol that owns the named tool.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use caravan::tool_protocol::ToolRegistry;
/// use caravan::tool_protocols::CustomToolProtocol;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
/// let mut registry = ToolRegistry::empty();
/// registry.add_protocol("local", Arc::new(CustomToolProtocol::new())).await?;
/// # Ok(())
/// # }
/// ```
pub struct ToolRegistry {
    protocols: HashMap<String, Arc<dyn ToolProtocol>>,
    tools: HashMap<String, RegisteredTool>,
    /// Insertion order of tool names so listings are stable.
    tool_order: Vec<String>,
}

impl ToolRegistry {
    /// Build an empty registry ready for [`add_protocol`](ToolRegistry::add_protocol).
    pub fn empty() -> Self {
        Self {
            protocols: HashMap::new(),
            tools: HashMap::new(),
            tool_order: Vec::new(),
        }
    }

    /// Register a protocol under `label` and discover its tools.
    ///
    /// Tools already registered under the same name are replaced — the most
    /// recently added protocol wins.
    pub async fn add_protocol(
        &mut self,
        label: &str,
        protocol: Arc<dyn ToolProtocol>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let discovered = protocol.list_tools().await?;
        self.protocols.insert(label.to_string(), protocol);

        for metadata in discovered {
            let name = metadata.name.clone();
            if !self.tools.contains_key(&name) {
                self.tool_order.push(name.clone());
            }
            self.tools.insert(
                name,
                RegisteredTool {
                    metadata,
                    protocol_label: label.to_string(),
                },
            );
        }
        Ok(())
    }

    /// Remove a protocol and every tool it contributed.
    pub fn remove_protocol(&mut self, label: &str) {
        if self.protocols.remove(label).is_some() {
            self.tools.retain(|_, t| t.protocol_label != label);
            let tools = &self.tools;
            self.tool_order.retain(|name| tools.contains_key(name));
        }
    }

    /// Labels of all registered protocols.
    pub fn list_protocols(&self) -> Vec<&str> {
        self.protocols.keys().map(|k| k.as_str()).collect()
    }

    /// List metadata for registered tools, in discovery order.
    pub fn list_tools(&self) -> Vec<&ToolMetadata> {
        self.tool_order
            .iter()
            .filter_map(|name| self.tools.get(name).map(|t| &t.metadata))
            .collect()
    }

    /// Whether a tool with this name is registered.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// The label of the protocol that owns `tool_name`, if registered.
    pub fn get_tool_protocol(&self, tool_name: &str) -> Option<&str> {
        self.tools
            .get(tool_name)
            .map(|t| t.protocol_label.as_str())
    }

    /// Execute a named tool with serialized parameters, routing to the
    /// protocol that owns it.
    pub async fn execute_tool(
        &self,
        tool_name: &str,
        parameters: serde_json::Value,
    ) -> Result<ToolResult, Box<dyn Error + Send + Sync>> {
        let registered = self
            .tools
            .get(tool_name)
            .ok_or_else(|| ToolError::NotFound(tool_name.to_string()))?;

        let protocol = self
            .protocols
            .get(&registered.protocol_label)
            .ok_or_else(|| ToolError::ProtocolError(format!(
                "Protocol '{}' no longer registered",
                registered.protocol_label
            )))?;

        protocol.execute(tool_name, parameters).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockProtocol {
        tool_name: String,
    }

    #[async_trait]
    impl ToolProtocol for MockProtocol {
        async fn execute(
            &self,
            tool_name: &str,
            _parameters: serde_json::Value,
        ) -> Result<ToolResult, Box<dyn Error + Send + Sync>> {
            Ok(ToolResult::success(serde_json::json!({
                "tool": tool_name,
                "result": "mock_result"
            })))
        }

        async fn list_tools(&self) -> Result<Vec<ToolMetadata>, Box<dyn Error + Send + Sync>> {
            Ok(vec![ToolMetadata::new(&self.tool_name, "A mock tool")])
        }

        fn protocol_name(&self) -> &str {
            "mock"
        }
    }

    #[test]
    fn test_tool_parameter_builder() {
        let param = ToolParameter::new("budget", ToolParameterType::Number)
            .with_description("Maximum price in GBP")
            .with_default(serde_json::json!(250.0));

        assert_eq!(param.name, "budget");
        assert_eq!(param.param_type, ToolParameterType::Number);
        assert_eq!(param.description, Some("Maximum price in GBP".to_string()));
        assert!(!param.required);
        assert_eq!(param.default, Some(serde_json::json!(250.0)));
    }

    #[test]
    fn test_tool_result_output_text() {
        let textual = ToolResult::success(serde_json::Value::String("plain".into()));
        assert_eq!(textual.output_text(), "plain");

        let structured = ToolResult::success(serde_json::json!({"count": 3}));
        assert!(structured.output_text().contains("\"count\": 3"));
    }

    #[tokio::test]
    async fn test_registry_discovery_and_routing() {
        let mut registry = ToolRegistry::empty();
        registry
            .add_protocol(
                "alpha",
                Arc::new(MockProtocol {
                    tool_name: "search_flights".to_string(),
                }),
            )
            .await
            .unwrap();
        registry
            .add_protocol(
                "beta",
                Arc::new(MockProtocol {
                    tool_name: "search_hotels".to_string(),
                }),
            )
            .await
            .unwrap();

        assert_eq!(registry.list_tools().len(), 2);
        assert!(registry.has_tool("search_flights"));
        assert_eq!(registry.get_tool_protocol("search_hotels"), Some("beta"));

        let result = registry
            .execute_tool("search_flights", serde_json::json!({}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output["tool"], "search_flights");
    }

    #[tokio::test]
    async fn test_registry_unknown_tool() {
        let registry = ToolRegistry::empty();
        let err = registry
            .execute_tool("missing", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Tool not found"));
    }

    #[tokio::test]
    async fn test_remove_protocol_drops_its_tools() {
        let mut registry = ToolRegistry::empty();
        registry
            .add_protocol(
                "alpha",
                Arc::new(MockProtocol {
                    tool_name: "search_flights".to_string(),
                }),
            )
            .await
            .unwrap();

        registry.remove_protocol("alpha");
        assert!(registry.list_tools().is_empty());
        assert!(!registry.has_tool("search_flights"));
    }
}
