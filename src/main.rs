//! Buddy - tool-calling browser assistant
//!
//! Main entry point for the Buddy CLI.

mod cli;
mod commands;
mod prompter;

use std::path::Path;

use clap::Parser;
use tracing::{debug, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use buddy_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};

use crate::cli::{Cli, Commands};

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_dir = ConfigLoader::expand_path(&logging.directory.to_string_lossy());
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("buddy")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Flushes the file writer on exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        // stdout carries answers, so the console layer goes to stderr
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()?;

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = ConfigLoader::load_or_default(path)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging)?;
    debug!("Buddy v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Config { action } => commands::config_command(&config, action),
        command => {
            let validation = ConfigValidator::validate(&config);
            for warning in &validation.warnings {
                warn!("Config {}: {}", warning.path, warning.message);
            }
            validation.into_result()?;
            run(config, command).await
        }
    }
}

async fn run(config: Config, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Chat {
            message,
            conversation,
            debug,
        } => commands::chat(config, message, conversation, debug).await,
        Commands::Task {
            task_id,
            content,
            conversation,
        } => commands::task(config, task_id, content, conversation).await,
        Commands::Tasks => commands::tasks(config).await,
        Commands::Conversations => commands::conversations(config).await,
        Commands::Pending => commands::pending(config).await,
        Commands::Blacklist { action } => commands::blacklist(config, action).await,
        Commands::Config { action } => commands::config_command(&config, action),
    }
}
