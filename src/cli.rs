//! CLI definitions for Buddy.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Buddy CLI.
#[derive(Parser)]
#[command(name = "buddy")]
#[command(about = "Tool-calling browser assistant driving Chrome over CDP")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (defaults to ~/.buddy/config.toml)
    #[arg(short, long, global = true, env = "BUDDY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Chat about the attached tab, letting the model use browser tools
    Chat {
        message: String,

        /// Continue an existing conversation
        #[arg(long)]
        conversation: Option<String>,

        /// Record the tool calls made in the conversation
        #[arg(long)]
        debug: bool,
    },

    /// Run a saved task over page content
    Task {
        task_id: String,

        /// Content to process (defaults to the attached page's text)
        #[arg(long)]
        content: Option<String>,

        /// Continue an existing conversation
        #[arg(long)]
        conversation: Option<String>,
    },

    /// List built-in and custom tasks
    Tasks,

    /// List stored conversations, newest first
    Conversations,

    /// Show an execution that is still in flight
    Pending,

    /// Manage sites Buddy stays away from
    Blacklist {
        #[command(subcommand)]
        action: BlacklistAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum BlacklistAction {
    List,

    /// Add a host name or `*.suffix` pattern
    Add { domain: String },

    Remove { domain: String },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Validate the configuration and print problems
    Check,
}
