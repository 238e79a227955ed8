//! Helpers shared by the record commands
//!
//! Opening the store, mapping errors to exit codes and printing results.

use crate::adapters::database::create_store;
use crate::config::{load_config, ClinicConfig};
use crate::core::clinic::ClinicCoordinator;
use crate::domain::{ClinicError, StoreError};
use clap::ValueEnum;
use serde::Serialize;

/// Exit code for success
pub const EXIT_OK: i32 = 0;
/// Exit code for a configuration problem
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for a rejected request (validation, not found, conflict)
pub const EXIT_REJECTED: i32 = 3;
/// Exit code when the store cannot be reached
pub const EXIT_CONNECTION: i32 = 4;
/// Exit code for anything else, including workflow inconsistencies
pub const EXIT_FATAL: i32 = 5;

/// How results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Exit code for an error returned by the clinic core
pub fn exit_code(error: &ClinicError) -> i32 {
    match error {
        e if e.is_rejection() => EXIT_REJECTED,
        ClinicError::Configuration(_) => EXIT_CONFIG,
        ClinicError::Store(StoreError::ConnectionFailed(_)) => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}

/// Print an error for the operator and return its exit code
pub fn report(error: &ClinicError) -> i32 {
    match error.field_errors() {
        Some(errors) => {
            println!("❌ Please correct the following:");
            for e in errors.iter() {
                println!("   {}: {}", e.field, e.message);
            }
        }
        None => println!("❌ {}", error.user_message()),
    }
    exit_code(error)
}

/// Load the configuration and open the configured store
///
/// On failure the problem has already been printed and the exit code is
/// returned as the error.
pub async fn open(config_path: &str) -> Result<(ClinicConfig, ClinicCoordinator), i32> {
    let config = load_config(config_path).map_err(|e| {
        println!("❌ Failed to load configuration file");
        println!("   Error: {e}");
        EXIT_CONFIG
    })?;

    let store = create_store(&config).await.map_err(|e| {
        println!("❌ Failed to open the {} store", config.database_target);
        println!("   Error: {e}");
        connection_exit_code(&e)
    })?;

    if let Err(e) = store.test_connection().await {
        println!("❌ Cannot reach the {} store", store.backend_name());
        println!("   Error: {e}");
        return Err(connection_exit_code(&e));
    }
    if let Err(e) = store.ensure_schema().await {
        println!("❌ Failed to prepare the database schema");
        println!("   Error: {e}");
        return Err(EXIT_FATAL);
    }

    let coordinator = ClinicCoordinator::from_settings(store, &config.clinic).map_err(|e| {
        println!("❌ Invalid clinic settings");
        println!("   Error: {e}");
        EXIT_CONFIG
    })?;

    Ok((config, coordinator))
}

fn connection_exit_code(error: &ClinicError) -> i32 {
    match error {
        ClinicError::Configuration(_) => EXIT_CONFIG,
        _ => EXIT_CONNECTION,
    }
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a result with `text` in text mode or as JSON, returning the exit code
pub fn emit<T: Serialize>(
    result: crate::domain::Result<T>,
    format: OutputFormat,
    text: impl FnOnce(&T),
) -> anyhow::Result<i32> {
    match result {
        Ok(value) => {
            match format {
                OutputFormat::Json => print_json(&value)?,
                OutputFormat::Text => text(&value),
            }
            Ok(EXIT_OK)
        }
        Err(e) => Ok(report(&e)),
    }
}
