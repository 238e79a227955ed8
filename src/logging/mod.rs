//! Logging and observability
//!
//! Structured logging through `tracing`, plus macros that give the workflow
//! events a fixed field layout so they can be searched in the JSON log.
//!
//! # Example
//!
//! ```no_run
//! use frontdesk::config::LoggingConfig;
//! use frontdesk::logging::init_logging;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(patient_id = 7, "Patient registered");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log an automatic or explicit appointment status transition
///
/// # Example
///
/// ```
/// use frontdesk::domain::{AppointmentId, AppointmentStatus};
/// use frontdesk::log_status_transition;
///
/// let id = AppointmentId::new(3);
/// log_status_transition!(id, AppointmentStatus::Pending, AppointmentStatus::Confirmed, "payment recorded");
/// ```
#[macro_export]
macro_rules! log_status_transition {
    ($appointment_id:expr, $from:expr, $to:expr, $trigger:expr) => {
        tracing::info!(
            appointment_id = %$appointment_id,
            from = %$from,
            to = %$to,
            trigger = $trigger,
            "Appointment status changed"
        );
    };
}

/// Log a broken workflow invariant
///
/// Always at error level with `inconsistency = true`, so operators can alert
/// on the field alone.
///
/// # Example
///
/// ```
/// use frontdesk::log_inconsistency;
///
/// log_inconsistency!("record payment", "appointment 4 still Pending after payment 9");
/// ```
#[macro_export]
macro_rules! log_inconsistency {
    ($operation:expr, $detail:expr) => {
        tracing::error!(
            inconsistency = true,
            operation = $operation,
            detail = %$detail,
            "Workflow invariant violated"
        );
    };
}

/// Log a request turned away by validation, a missing record or a conflict
///
/// # Example
///
/// ```
/// use frontdesk::domain::{ClinicError, EntityKind};
/// use frontdesk::log_rejection;
///
/// let error = ClinicError::not_found(EntityKind::Doctor, 12);
/// log_rejection!("update doctor", &error);
/// ```
#[macro_export]
macro_rules! log_rejection {
    ($operation:expr, $error:expr) => {
        tracing::info!(
            operation = $operation,
            error = %$error,
            "Request rejected"
        );
    };
}
