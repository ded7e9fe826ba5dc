//! Built-in tools ready to register with agents:
//!
//! - [`WebSearchTool`] - Tavily-backed web search with markdown results
//! - [`FileReaderTool`] - sandboxed file-content reads with soft error strings
//!
//! Each tool implements [`ToolProtocol`](crate::tool_protocol::ToolProtocol)
//! directly, so it can be handed to a
//! [`ToolRegistry`](crate::tool_protocol::ToolRegistry) or aggregated into a
//! [`StdioToolServer`](crate::stdio_server::StdioToolServer).

pub mod file_reader;
pub mod web_search;

pub use file_reader::FileReaderTool;
pub use web_search::WebSearchTool;
