use std::path::PathBuf;

use clap::Parser;

/// Prism chat gateway
#[derive(Debug, Parser)]
#[command(name = "prism", about = "Chat gateway for completions- and messages-style LLM providers")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "prism.toml", env = "PRISM_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "PRISM_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
