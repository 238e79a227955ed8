//! Domain models and types for the clinic front desk.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientId`], [`DoctorId`], [`AppointmentId`], ...)
//! - **Entity records** ([`Patient`], [`Doctor`], [`Appointment`], [`Payment`])
//! - **Drafts** (validated field sets ready to be written) and **inputs**
//!   (raw submitted values)
//! - **Error types** ([`ClinicError`], [`StoreError`], [`ValidationErrors`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers are newtypes, so they cannot be mixed up:
//!
//! ```rust
//! use frontdesk::domain::{DoctorId, PatientId};
//!
//! let patient = PatientId::new(1);
//! let doctor = DoctorId::new(1);
//!
//! // This won't compile - type safety prevents mixing IDs
//! // let wrong: PatientId = doctor;
//! # let _ = (patient, doctor);
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ClinicError>`]:
//!
//! ```rust
//! use frontdesk::domain::{ClinicError, EntityKind, Result};
//!
//! fn example() -> Result<()> {
//!     Err(ClinicError::not_found(EntityKind::Patient, 7))
//! }
//! # assert!(example().is_err());
//! ```

pub mod appointment;
pub mod context;
pub mod doctor;
pub mod errors;
pub mod ids;
pub mod patient;
pub mod payment;
pub mod person;
pub mod result;

// Re-export commonly used types for convenience
pub use appointment::{
    Appointment, AppointmentDraft, AppointmentInput, AppointmentStatus, DEFAULT_PURPOSE,
};
pub use doctor::{
    Doctor, DoctorDraft, DoctorInput, DoctorProfile, DoctorProfileDraft, DoctorSpecialization,
    SpecializationDraft, SpecializationInput,
};
pub use errors::{ClinicError, FieldError, StoreError, ValidationErrors};
pub use ids::{AppointmentId, DoctorId, EntityKind, PatientId, PaymentId, SpecializationId};
pub use patient::{Gender, Patient, PatientDraft, PatientInput};
pub use payment::{Payment, PaymentDraft, PaymentInput, PaymentMethod, PaymentStatus};
pub use person::PersonName;
pub use result::Result;
