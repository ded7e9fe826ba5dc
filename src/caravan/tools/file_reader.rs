//! # File Reader Tool
//!
//! Returns the contents of a file so agents can ground their answers in
//! local project files. Failures are reported as soft `"Error: ..."` strings
//! in the tool output — the agent sees what went wrong and can adjust,
//! instead of the tool boundary surfacing a transport error.
//!
//! An optional sandbox root confines reads: when set, any path that resolves
//! outside the root is refused.
//!
//! ## Example
//!
//! ```rust,no_run
//! use caravan::tools::FileReaderTool;
//! use std::path::PathBuf;
//!
//! let tool = FileReaderTool::new().with_root(PathBuf::from("/workspace/project"));
//! let content = tool.read_file("Cargo.toml");
//! println!("{}", content);
//! ```

use crate::caravan::tool_protocol::{
    ToolError, ToolMetadata, ToolParameter, ToolParameterType, ToolProtocol, ToolResult,
};
use async_trait::async_trait;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Tool that reads file contents, optionally confined to a sandbox root.
pub struct FileReaderTool {
    root: Option<PathBuf>,
}

impl FileReaderTool {
    /// Create an unconfined reader (any path the process can access).
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Confine reads to `root`: relative paths resolve against it and any
    /// path escaping it is refused (builder pattern).
    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = Some(root);
        self
    }

    /// Read a file and return its contents, or a soft `"Error: ..."` string.
    pub fn read_file(&self, file_path: &str) -> String {
        if file_path.is_empty() {
            return "Error: file_path is required".to_string();
        }

        let resolved = match self.resolve(Path::new(file_path)) {
            Ok(path) => path,
            Err(e) => return format!("Error: {}", e),
        };

        match fs::read_to_string(&resolved) {
            Ok(content) => {
                if content.is_empty() {
                    "No matches found.".to_string()
                } else {
                    content
                }
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    /// Resolve a requested path against the sandbox root, refusing escapes.
    fn resolve(&self, requested: &Path) -> Result<PathBuf, String> {
        match &self.root {
            None => Ok(requested.to_path_buf()),
            Some(root) => {
                let joined = if requested.is_absolute() {
                    requested.to_path_buf()
                } else {
                    root.join(requested)
                };
                let canonical = joined
                    .canonicalize()
                    .map_err(|e| format!("cannot resolve '{}': {}", requested.display(), e))?;
                let canonical_root = root
                    .canonicalize()
                    .map_err(|e| format!("cannot resolve sandbox root: {}", e))?;
                if !canonical.starts_with(&canonical_root) {
                    return Err(format!(
                        "'{}' is outside the allowed directory",
                        requested.display()
                    ));
                }
                Ok(canonical)
            }
        }
    }
}

impl Default for FileReaderTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolProtocol for FileReaderTool {
    async fn execute(
        &self,
        tool_name: &str,
        parameters: serde_json::Value,
    ) -> Result<ToolResult, Box<dyn Error + Send + Sync>> {
        if tool_name != "read_file" {
            return Err(Box::new(ToolError::NotFound(tool_name.to_string())));
        }

        let file_path = parameters
            .get("file_path")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        Ok(ToolResult::success(serde_json::Value::String(
            self.read_file(file_path),
        )))
    }

    async fn list_tools(&self) -> Result<Vec<ToolMetadata>, Box<dyn Error + Send + Sync>> {
        Ok(vec![ToolMetadata::new(
            "read_file",
            "Read a file and return its content",
        )
        .with_parameter(
            ToolParameter::new("file_path", ToolParameterType::String)
                .with_description("Path to the file to read")
                .required(),
        )])
    }

    fn protocol_name(&self) -> &str {
        "file-reader"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "remember the budget").unwrap();

        let tool = FileReaderTool::new();
        let content = tool.read_file(path.to_str().unwrap());
        assert!(content.contains("remember the budget"));
    }

    #[test]
    fn test_missing_file_is_soft_error() {
        let tool = FileReaderTool::new();
        let content = tool.read_file("/definitely/not/here.txt");
        assert!(content.starts_with("Error:"));
    }

    #[test]
    fn test_empty_path_is_soft_error() {
        let tool = FileReaderTool::new();
        assert_eq!(tool.read_file(""), "Error: file_path is required");
    }

    #[test]
    fn test_sandbox_refuses_escapes() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("inner");
        fs::create_dir(&inner).unwrap();
        fs::write(dir.path().join("secret.txt"), "secret").unwrap();

        let tool = FileReaderTool::new().with_root(inner);
        let content = tool.read_file("../secret.txt");
        assert!(content.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_protocol_surface() {
        let tool = FileReaderTool::new();
        let listing = tool.list_tools().await.unwrap();
        assert_eq!(listing[0].name, "read_file");

        let result = tool
            .execute("read_file", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(result.output_text(), "Error: file_path is required");
    }
}
