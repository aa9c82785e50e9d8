//! Shared test harness: mock upstream servers and a gateway launcher
#![allow(dead_code)]

pub mod config;
pub mod mock_completions;
pub mod mock_messages;
pub mod mock_search;
pub mod server;
