// Frontdesk - Clinic front-desk core
// Copyright (c) 2025 Frontdesk Contributors
// Licensed under the MIT License

use clap::Parser;
use frontdesk::cli::commands::common::EXIT_FATAL;
use frontdesk::cli::Cli;
use frontdesk::config::{load_config, LoggingConfig};
use frontdesk::logging::{init_logging, LoggingGuard};
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    // This is optional - if .env doesn't exist, it's silently ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Frontdesk - Clinic front-desk core"
    );

    let exit_code = match cli.execute().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // Flush file logs before exiting
    drop(guard);
    process::exit(exit_code);
}

/// Console logging always; file logging when the configuration enables it
///
/// The configuration is read leniently here: a missing or broken file only
/// means console-only logging, the command itself reports the problem.
fn setup_logging(cli: &Cli) -> anyhow::Result<LoggingGuard> {
    let console_only = LoggingConfig {
        local_enabled: false,
        ..LoggingConfig::default()
    };

    let (level, logging) = match load_config(&cli.config) {
        Ok(config) => (config.application.log_level, config.logging),
        Err(_) => ("info".to_string(), console_only.clone()),
    };
    let level = cli.log_level.clone().unwrap_or(level);

    match init_logging(&level, &logging) {
        Ok(guard) => Ok(guard),
        Err(e) if logging.local_enabled => {
            let guard = init_logging(&level, &console_only)?;
            tracing::warn!(error = %e, "File logging unavailable, logging to console only");
            Ok(guard)
        }
        Err(e) => Err(e.into()),
    }
}
