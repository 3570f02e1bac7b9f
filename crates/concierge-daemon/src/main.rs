//! Concierge
//!
//! A conversational front-end routing free-text questions to a curated
//! knowledge base, escalating to a human agent when no confident answer
//! exists.
//!
//! # Usage
//!
//! ```bash
//! concierge chat [--offline] [--conversation-id ID]
//! concierge validate
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/concierge/config.toml)
//! 3. Environment variables (CONCIERGE_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use concierge_daemon::{run_chat, validate, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            offline,
            conversation_id,
        } => {
            run_chat(
                cli.config.as_deref(),
                cli.log_level.as_deref(),
                offline,
                &conversation_id,
            )
            .await?;
        }
        Commands::Validate => {
            validate(cli.config.as_deref(), cli.log_level.as_deref()).await?;
        }
    }

    Ok(())
}
