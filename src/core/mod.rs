//! Core business logic for the front desk.
//!
//! # Modules
//!
//! - [`validation`] - Field rules and cross-record checks run before every write
//! - [`workflow`] - Appointment status rules driven by the payment lifecycle
//! - [`clinic`] - The coordinator that runs each operation in one transaction
//!
//! # Request Flow
//!
//! 1. **Begin**: Open a store transaction
//! 2. **Validate**: Check the submitted fields and the records they refer to
//! 3. **Write**: Insert, update or delete the addressed record
//! 4. **Workflow**: Move the linked appointment status, then read it back
//! 5. **Commit** on success, **roll back** on any error
//!
//! # Example
//!
//! ```rust,no_run
//! use frontdesk::adapters::database::create_store;
//! use frontdesk::config::load_config;
//! use frontdesk::core::clinic::ClinicCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("frontdesk.toml")?;
//! let store = create_store(&config).await?;
//! let coordinator = ClinicCoordinator::from_settings(store, &config.clinic)?;
//!
//! let summary = coordinator.dashboard().await?;
//! println!("Upcoming: {}", summary.upcoming_appointments);
//! println!("Unpaid: {}", summary.unpaid_payments);
//! # Ok(())
//! # }
//! ```

pub mod clinic;
pub mod validation;
pub mod workflow;
