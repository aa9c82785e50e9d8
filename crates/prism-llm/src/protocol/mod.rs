//! Upstream wire dialects

pub mod completions;
pub mod messages;
