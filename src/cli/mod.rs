//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the front desk using clap.

pub mod commands;

use clap::{Parser, Subcommand};
use commands::common::OutputFormat;

/// Frontdesk - clinic front-desk records and appointment workflow
#[derive(Parser, Debug)]
#[command(name = "frontdesk")]
#[command(version, about, long_about = None)]
#[command(author = "Frontdesk Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "frontdesk.toml", env = "FRONTDESK_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FRONTDESK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Print results as text or JSON
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show today's appointments and open payments
    Dashboard(commands::dashboard::DashboardArgs),

    /// Manage patients
    Patient(commands::patient::PatientArgs),

    /// Manage doctors
    Doctor(commands::doctor::DoctorArgs),

    /// Manage doctor specializations
    Specialization(commands::specialization::SpecializationArgs),

    /// Book and manage appointments
    Appointment(commands::appointment::AppointmentArgs),

    /// Record and manage payments
    Payment(commands::payment::PaymentArgs),
}

impl Cli {
    /// Run the selected command and return the process exit code
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let config = self.config.as_str();
        match &self.command {
            Commands::Init(args) => args.execute().await,
            Commands::ValidateConfig(args) => args.execute(config).await,
            Commands::Dashboard(args) => args.execute(config, self.format).await,
            Commands::Patient(args) => args.execute(config, self.format).await,
            Commands::Doctor(args) => args.execute(config, self.format).await,
            Commands::Specialization(args) => args.execute(config, self.format).await,
            Commands::Appointment(args) => args.execute(config, self.format).await,
            Commands::Payment(args) => args.execute(config, self.format).await,
        }
    }
}
