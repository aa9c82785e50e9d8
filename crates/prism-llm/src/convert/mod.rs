//! Canonical-to-wire converters

pub mod completions;
pub mod messages;
