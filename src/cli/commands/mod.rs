//! CLI command implementations
//!
//! This module contains all CLI command implementations. Each `execute`
//! returns the process exit code; see [`common`] for the code table.

pub mod appointment;
pub mod common;
pub mod dashboard;
pub mod doctor;
pub mod init;
pub mod patient;
pub mod payment;
pub mod specialization;
pub mod validate;
