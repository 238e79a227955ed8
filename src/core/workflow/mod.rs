//! Appointment status workflow
//!
//! - [`machine`] - which status an appointment moves to for each event
//! - [`plan`] - payment commands and the writes they imply
//! - [`engine`] - executes a plan inside a transaction and verifies it

pub mod engine;
pub mod machine;
pub mod plan;

pub use engine::{execute, WorkflowOutcome};
pub use machine::{initial_status, resolve_manual_status, StatusDecision};
pub use plan::{
    DeletePayment, PaymentCommand, PrimaryWrite, RecordPayment, RevisePayment, SettlePayment,
    StatusChange, WorkflowPlan,
};
