//! Tool trait and name-to-handler registry

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ToolError;

/// Declared interface of a tool, attached to provider requests as a schema
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// Tool name the model invokes it by
    pub name: String,
    /// Human-readable description shown to the model
    pub description: String,
    /// JSON Schema for the tool arguments
    pub parameters: serde_json::Value,
}

/// A capability the model can invoke with JSON arguments
#[async_trait]
pub trait Tool: Send + Sync {
    /// Declared interface of this tool
    fn spec(&self) -> ToolSpec;

    /// Execute with JSON-encoded arguments, returning result text
    async fn execute(&self, arguments: &str) -> Result<String, ToolError>;
}

/// Maps tool names to executable handlers
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its declared name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.spec().name, tool);
    }

    /// Whether any tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Declared interfaces of all registered tools
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.values().map(|t| t.spec()).collect()
    }

    /// Execute a named tool, converting every failure into result text
    ///
    /// A tool failure must not abort the surrounding chat request: the model
    /// receives a description of what went wrong and can answer gracefully.
    pub async fn run(&self, name: &str, arguments: &str) -> String {
        let Some(tool) = self.tools.get(name) else {
            tracing::warn!(tool = name, "model requested unknown tool");
            return format!("Tool '{name}' is not available.");
        };

        match tool.execute(arguments).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool execution failed");
                format!("Tool '{name}' failed: {e}")
            }
        }
    }
}
