//! CLI argument parsing for the concierge daemon.

use clap::{Parser, Subcommand};

/// Concierge
///
/// A conversational front-end routing free-text questions to a curated
/// knowledge base, with human escalation when no confident answer exists.
#[derive(Parser, Debug)]
#[command(name = "concierge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/concierge/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive console chat session
    Chat {
        /// Use the deterministic offline embedder and a permissive local
        /// model instead of the API collaborators
        #[arg(long)]
        offline: bool,

        /// Conversation identifier to chat as
        #[arg(long, default_value = "console")]
        conversation_id: String,
    },

    /// Validate the knowledge base and menu files without starting a chat
    Validate,
}
