//! Store abstraction layer
//!
//! This module provides a trait-based abstraction for storage, allowing the
//! clinic core to run against different backends (PostgreSQL, in-memory).

pub mod factory;
pub mod filters;
pub mod traits;

pub use factory::create_store;
pub use filters::{
    AppointmentFilter, DoctorFilter, PatientFilter, PaymentFilter, SpecializationFilter,
};
pub use traits::{ClinicStore, StoreTransaction};
