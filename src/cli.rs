//! Command-line interface for strictly_relay.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Relay - realtime two-player tic-tac-toe over WebSockets
#[derive(Parser, Debug)]
#[command(name = "strictly_relay")]
#[command(about = "Session coordinator for two-player tic-tac-toe", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the WebSocket relay server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long, env = "STRICTLY_RELAY_CONFIG")]
        config: Option<PathBuf>,

        /// Host to bind to (overrides the config file)
        #[arg(long, env = "STRICTLY_RELAY_HOST")]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long, env = "STRICTLY_RELAY_PORT")]
        port: Option<u16>,

        /// Log filter used when RUST_LOG is unset
        #[arg(long)]
        log_filter: Option<String>,
    },

    /// Print the effective configuration as TOML and exit
    Config {
        /// Path to a TOML config file
        #[arg(short, long, env = "STRICTLY_RELAY_CONFIG")]
        config: Option<PathBuf>,
    },
}
