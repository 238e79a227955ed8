//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the front desk configuration file.

use crate::adapters::postgresql::client::redact_connection_string;
use crate::cli::commands::common::{EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::config::schema::DatabaseTarget;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Database Target: {}", config.database_target);

        if let (DatabaseTarget::PostgreSQL, Some(pg_config)) =
            (&config.database_target, &config.postgresql)
        {
            println!(
                "  PostgreSQL Connection: {}",
                redact_connection_string(pg_config.connection_string.expose_secret().as_ref())
            );
            println!("  Max Connections: {}", pg_config.max_connections);
            println!("  SSL Mode: {}", pg_config.ssl_mode);
        }

        println!(
            "  Clinic UTC Offset: {} minutes",
            config.clinic.utc_offset_minutes
        );
        println!("  Default Purpose: {}", config.clinic.default_purpose);
        if config.logging.local_enabled {
            println!(
                "  Log Files: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        } else {
            println!("  Log Files: disabled");
        }
        println!();
        Ok(EXIT_OK)
    }
}
