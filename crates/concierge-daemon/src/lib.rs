//! # concierge-daemon
//!
//! The console binary: clap CLI, layered configuration, tracing init, the
//! interactive chat loop, and knowledge/menu validation.

pub mod cli;
pub mod collaborators;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{run_chat, validate};
