//! Tool execution layer for the Prism chat gateway
//!
//! Provides the `Tool` trait, the registry that model-requested tool calls
//! are dispatched through, and the built-in `web_search` tool with its
//! page-fetch sanitizer.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod error;
pub mod fetch;
pub mod registry;
pub mod search;

pub use error::ToolError;
pub use fetch::PageFetcher;
pub use registry::{Tool, ToolRegistry, ToolSpec};
pub use search::WebSearchTool;
