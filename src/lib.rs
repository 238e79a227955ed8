// Frontdesk - Clinic front-desk core
// Copyright (c) 2025 Frontdesk Contributors
// Licensed under the MIT License

//! # Frontdesk - Clinic front-desk core
//!
//! Frontdesk keeps the records a small clinic's front desk works with
//! (patients, doctors and their specializations, appointments, payments) and
//! drives each appointment through its status workflow as payments are
//! recorded, settled and removed.
//!
//! ## Overview
//!
//! This library provides:
//! - **Validation** of every submitted record, with all field errors reported together
//! - **Workflow** rules that move an appointment `Pending -> Confirmed -> Completed`
//! - **Atomic operations**: each write and its status side effect commit together
//! - **Stores** for PostgreSQL and an in-memory backend
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (validation, workflow, coordinator)
//! - [`adapters`] - Storage backends (PostgreSQL, memory)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust
//! use frontdesk::adapters::memory::MemoryStore;
//! use frontdesk::core::clinic::{ClinicCoordinator, SystemClock};
//! use frontdesk::domain::DoctorInput;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> frontdesk::domain::Result<()> {
//! let clinic = ClinicCoordinator::new(Arc::new(MemoryStore::new()), Arc::new(SystemClock::utc()));
//!
//! let doctor = clinic
//!     .create_doctor(&DoctorInput {
//!         first_name: Some("Bo".into()),
//!         last_name: Some("Chen".into()),
//!         contact: Some("555-0120".into()),
//!         specializations: vec!["Cardiology".into()],
//!         ..DoctorInput::default()
//!     })
//!     .await?;
//!
//! assert_eq!(doctor.labels(), ["Cardiology"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Workflow
//!
//! Appointment status follows its payment:
//!
//! | Event | Appointment |
//! |---|---|
//! | booked | Pending |
//! | unpaid payment recorded | Confirmed |
//! | payment paid | Completed |
//! | paid payment reverted to unpaid | Confirmed |
//! | paid payment deleted | Pending |
//!
//! Only `Cancelled` can be set by hand. If the status write that should go
//! with a payment change fails, or reads back wrong, the whole operation is
//! rolled back with [`domain::ClinicError::Inconsistency`].
//!
//! ## Error Handling
//!
//! Every operation returns [`domain::Result`]:
//!
//! ```rust
//! use frontdesk::domain::{ClinicError, EntityKind};
//!
//! let err = ClinicError::not_found(EntityKind::Payment, 12);
//! assert!(err.is_rejection());
//! assert_eq!(err.user_message(), "No payment with ID 12 exists.");
//! ```
//!
//! ## Logging
//!
//! Frontdesk uses structured logging with the `tracing` crate. Status
//! transitions and workflow inconsistencies have dedicated macros:
//!
//! ```rust
//! use frontdesk::domain::{AppointmentId, AppointmentStatus};
//!
//! frontdesk::log_status_transition!(
//!     AppointmentId::new(4),
//!     AppointmentStatus::Confirmed,
//!     AppointmentStatus::Completed,
//!     "mark payment paid"
//! );
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod core;
