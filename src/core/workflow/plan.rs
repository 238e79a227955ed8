//! Payment commands and their write plans
//!
//! A command names what the user asked for. [`plan`] turns it into the
//! concrete writes without touching storage: the primary payment write and
//! the status change, if any, that the linked appointment must undergo.

use crate::core::workflow::machine;
use crate::domain::{
    Appointment, AppointmentId, AppointmentStatus, Payment, PaymentDraft, PaymentId, PaymentStatus,
};

/// Record a new payment against an appointment
#[derive(Debug, Clone)]
pub struct RecordPayment {
    pub draft: PaymentDraft,
}

/// Replace the fields of an existing payment
#[derive(Debug, Clone)]
pub struct RevisePayment {
    pub current: Payment,
    pub draft: PaymentDraft,
}

/// Mark an existing payment as paid, keeping its other fields
#[derive(Debug, Clone)]
pub struct SettlePayment {
    pub current: Payment,
}

/// Remove an existing payment
#[derive(Debug, Clone)]
pub struct DeletePayment {
    pub current: Payment,
}

#[derive(Debug, Clone)]
pub enum PaymentCommand {
    Record(RecordPayment),
    Revise(RevisePayment),
    Settle(SettlePayment),
    Delete(DeletePayment),
}

impl PaymentCommand {
    /// Appointment whose status the command may move
    pub fn appointment_id(&self) -> AppointmentId {
        match self {
            Self::Record(cmd) => cmd.draft.appointment_id,
            Self::Revise(cmd) => cmd.current.appointment_id,
            Self::Settle(cmd) => cmd.current.appointment_id,
            Self::Delete(cmd) => cmd.current.appointment_id,
        }
    }

    /// Operation name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Record(_) => "record payment",
            Self::Revise(_) => "update payment",
            Self::Settle(_) => "mark payment paid",
            Self::Delete(_) => "delete payment",
        }
    }
}

impl From<RecordPayment> for PaymentCommand {
    fn from(cmd: RecordPayment) -> Self {
        Self::Record(cmd)
    }
}

impl From<RevisePayment> for PaymentCommand {
    fn from(cmd: RevisePayment) -> Self {
        Self::Revise(cmd)
    }
}

impl From<SettlePayment> for PaymentCommand {
    fn from(cmd: SettlePayment) -> Self {
        Self::Settle(cmd)
    }
}

impl From<DeletePayment> for PaymentCommand {
    fn from(cmd: DeletePayment) -> Self {
        Self::Delete(cmd)
    }
}

/// The payment write a command performs
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryWrite {
    Insert(PaymentDraft),
    Update(PaymentId, PaymentDraft),
    Delete(PaymentId),
}

/// Planned move of the linked appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub appointment_id: AppointmentId,
    pub from: AppointmentStatus,
    pub to: AppointmentStatus,
}

/// Everything one payment command will write
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowPlan {
    pub operation: &'static str,
    pub primary: PrimaryWrite,
    pub status_change: Option<StatusChange>,
}

impl WorkflowPlan {
    /// Appointment status expected once the plan has run
    pub fn expected_status(&self, current: AppointmentStatus) -> AppointmentStatus {
        self.status_change.map_or(current, |change| change.to)
    }
}

/// Plan a payment command against the current state of its appointment
///
/// `appointment` must be the record `command.appointment_id()` resolves to.
pub fn plan(command: &PaymentCommand, appointment: &Appointment) -> WorkflowPlan {
    let current = appointment.status;
    let (primary, target) = match command {
        PaymentCommand::Record(cmd) => (
            PrimaryWrite::Insert(cmd.draft.clone()),
            machine::on_payment_recorded(current, cmd.draft.status),
        ),
        PaymentCommand::Revise(cmd) => (
            PrimaryWrite::Update(cmd.current.id, cmd.draft.clone()),
            machine::on_payment_revised(current, cmd.current.status, cmd.draft.status),
        ),
        PaymentCommand::Settle(cmd) => {
            let mut draft = PaymentDraft::from(&cmd.current);
            draft.status = PaymentStatus::Paid;
            (
                PrimaryWrite::Update(cmd.current.id, draft),
                machine::on_payment_revised(current, cmd.current.status, PaymentStatus::Paid),
            )
        }
        PaymentCommand::Delete(cmd) => (
            PrimaryWrite::Delete(cmd.current.id),
            machine::on_payment_deleted(current, cmd.current.status),
        ),
    };

    WorkflowPlan {
        operation: command.name(),
        primary,
        status_change: target.map(|to| StatusChange {
            appointment_id: appointment.id,
            from: current,
            to,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DoctorId, PatientId, PaymentMethod};
    use chrono::{NaiveDate, NaiveTime, Utc};
    use rust_decimal::Decimal;

    fn appointment(status: AppointmentStatus) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: AppointmentId::new(10),
            patient_id: PatientId::new(1),
            doctor_id: DoctorId::new(2),
            appointment_date: NaiveDate::from_ymd_opt(2030, 1, 15).unwrap(),
            appointment_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            purpose: "Checkup".to_string(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn draft(status: PaymentStatus) -> PaymentDraft {
        PaymentDraft {
            appointment_id: AppointmentId::new(10),
            amount: Decimal::new(5000, 2),
            method: PaymentMethod::Cash,
            status,
        }
    }

    fn payment(status: PaymentStatus) -> Payment {
        let now = Utc::now();
        Payment {
            id: PaymentId::new(4),
            appointment_id: AppointmentId::new(10),
            amount: Decimal::new(5000, 2),
            method: PaymentMethod::Card,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_record_unpaid_confirms() {
        let command = PaymentCommand::from(RecordPayment {
            draft: draft(PaymentStatus::Unpaid),
        });
        let plan = plan(&command, &appointment(AppointmentStatus::Pending));

        assert_eq!(plan.primary, PrimaryWrite::Insert(draft(PaymentStatus::Unpaid)));
        assert_eq!(
            plan.status_change,
            Some(StatusChange {
                appointment_id: AppointmentId::new(10),
                from: AppointmentStatus::Pending,
                to: AppointmentStatus::Confirmed,
            })
        );
        assert_eq!(plan.operation, "record payment");
    }

    #[test]
    fn test_settle_keeps_other_fields() {
        let current = payment(PaymentStatus::Unpaid);
        let command = PaymentCommand::from(SettlePayment {
            current: current.clone(),
        });
        let plan = plan(&command, &appointment(AppointmentStatus::Confirmed));

        let PrimaryWrite::Update(id, written) = &plan.primary else {
            panic!("expected an update, got {:?}", plan.primary);
        };
        assert_eq!(*id, current.id);
        assert_eq!(written.method, PaymentMethod::Card);
        assert_eq!(written.amount, current.amount);
        assert_eq!(written.status, PaymentStatus::Paid);
        assert_eq!(
            plan.expected_status(AppointmentStatus::Confirmed),
            AppointmentStatus::Completed
        );
    }

    #[test]
    fn test_revise_amount_only_leaves_appointment() {
        let mut changed = draft(PaymentStatus::Unpaid);
        changed.amount = Decimal::new(7500, 2);
        let command = PaymentCommand::from(RevisePayment {
            current: payment(PaymentStatus::Unpaid),
            draft: changed,
        });
        let plan = plan(&command, &appointment(AppointmentStatus::Confirmed));

        assert!(plan.status_change.is_none());
        assert_eq!(
            plan.expected_status(AppointmentStatus::Confirmed),
            AppointmentStatus::Confirmed
        );
    }

    #[test]
    fn test_delete_paid_reverts_to_pending() {
        let command = PaymentCommand::from(DeletePayment {
            current: payment(PaymentStatus::Paid),
        });
        let plan = plan(&command, &appointment(AppointmentStatus::Completed));

        assert_eq!(plan.primary, PrimaryWrite::Delete(PaymentId::new(4)));
        assert_eq!(
            plan.status_change.map(|c| c.to),
            Some(AppointmentStatus::Pending)
        );
    }

    #[test]
    fn test_delete_unpaid_plans_no_change() {
        let command = PaymentCommand::from(DeletePayment {
            current: payment(PaymentStatus::Unpaid),
        });
        assert_eq!(command.appointment_id(), AppointmentId::new(10));
        assert!(plan(&command, &appointment(AppointmentStatus::Confirmed))
            .status_change
            .is_none());
    }
}
