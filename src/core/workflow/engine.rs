//! Runs payment commands inside a store transaction
//!
//! The engine performs the primary payment write, applies the planned status
//! change to the linked appointment and then reads the appointment back. Any
//! failure after the primary write is an inconsistency: the caller must roll
//! the transaction back.

use crate::adapters::database::StoreTransaction;
use crate::core::workflow::plan::{plan, PaymentCommand, PrimaryWrite, WorkflowPlan};
use crate::domain::{Appointment, AppointmentStatus, ClinicError, EntityKind, Payment, Result};

/// What a payment command left behind
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    /// The written payment; `None` after a delete
    pub payment: Option<Payment>,
    /// The linked appointment as read back after the writes
    pub appointment: Appointment,
    pub plan: WorkflowPlan,
}

/// Plan and execute a payment command
///
/// # Errors
///
/// - [`ClinicError::NotFound`] if the appointment or payment does not resolve
///   before anything is written
/// - any store error from the primary write, unchanged
/// - [`ClinicError::Inconsistency`] if the status write fails, the
///   appointment disappears, or the status read back is not the planned one
pub async fn execute(
    tx: &mut dyn StoreTransaction,
    command: PaymentCommand,
) -> Result<WorkflowOutcome> {
    let appointment_id = command.appointment_id();
    let appointment = tx
        .get_appointment(appointment_id)
        .await?
        .ok_or_else(|| ClinicError::not_found(EntityKind::Appointment, appointment_id))?;

    let plan = plan(&command, &appointment);
    let operation = plan.operation;

    let payment = match &plan.primary {
        PrimaryWrite::Insert(draft) => Some(tx.insert_payment(draft).await?),
        PrimaryWrite::Update(id, draft) => Some(
            tx.update_payment(*id, draft)
                .await?
                .ok_or_else(|| ClinicError::not_found(EntityKind::Payment, *id))?,
        ),
        PrimaryWrite::Delete(id) => {
            if !tx.delete_payment(*id).await? {
                return Err(ClinicError::not_found(EntityKind::Payment, *id));
            }
            None
        }
    };

    if let Some(change) = plan.status_change {
        match tx
            .set_appointment_status(change.appointment_id, change.to)
            .await
        {
            Ok(Some(_)) => {
                crate::log_status_transition!(
                    change.appointment_id,
                    change.from,
                    change.to,
                    operation
                );
            }
            Ok(None) => {
                return Err(inconsistency(
                    operation,
                    format!(
                        "appointment {} vanished before its status could move to {}",
                        change.appointment_id, change.to
                    ),
                ));
            }
            Err(e) => {
                return Err(inconsistency(
                    operation,
                    format!(
                        "status write {} -> {} on appointment {} failed: {e}",
                        change.from, change.to, change.appointment_id
                    ),
                ));
            }
        }
    }

    let expected = plan.expected_status(appointment.status);
    let appointment = verify(tx, operation, &appointment, expected).await?;

    Ok(WorkflowOutcome {
        payment,
        appointment,
        plan,
    })
}

/// Read the appointment back and check it holds the expected status
async fn verify(
    tx: &mut dyn StoreTransaction,
    operation: &'static str,
    before: &Appointment,
    expected: AppointmentStatus,
) -> Result<Appointment> {
    let stored = match tx.get_appointment(before.id).await {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            return Err(inconsistency(
                operation,
                format!("appointment {} missing on read-back", before.id),
            ));
        }
        Err(e) => {
            return Err(inconsistency(
                operation,
                format!("reading back appointment {} failed: {e}", before.id),
            ));
        }
    };

    if stored.status != expected {
        return Err(inconsistency(
            operation,
            format!(
                "appointment {} is {} after the write, expected {}",
                stored.id, stored.status, expected
            ),
        ));
    }

    Ok(stored)
}

fn inconsistency(operation: &'static str, detail: String) -> ClinicError {
    crate::log_inconsistency!(operation, detail);
    ClinicError::Inconsistency(format!("{operation}: {detail}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::ClinicStore;
    use crate::adapters::memory::MemoryStore;
    use crate::core::workflow::plan::{DeletePayment, RecordPayment, SettlePayment};
    use crate::domain::{
        AppointmentDraft, AppointmentId, DoctorDraft, Gender, PatientDraft,
        PaymentDraft, PaymentMethod, PaymentStatus, PersonName,
    };
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;

    async fn seeded(store: &MemoryStore) -> AppointmentId {
        let mut tx = store.begin().await.unwrap();
        let patient = tx
            .insert_patient(&PatientDraft {
                name: PersonName::new("Ana", "Reyes", None),
                age: 34,
                gender: Gender::Female,
                contact: "0917-555-0101".to_string(),
                address: "12 Mabini Street, Quezon City".to_string(),
            })
            .await
            .unwrap();
        let doctor = tx
            .insert_doctor(&DoctorDraft {
                name: PersonName::new("Jose", "Santos", Some('P')),
                contact: "0917-555-0202".to_string(),
            })
            .await
            .unwrap();
        let appointment = tx
            .insert_appointment(&AppointmentDraft {
                patient_id: patient.id,
                doctor_id: doctor.id,
                appointment_date: NaiveDate::from_ymd_opt(2030, 3, 1).unwrap(),
                appointment_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                purpose: "Follow-up".to_string(),
                status: AppointmentStatus::Pending,
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();
        appointment.id
    }

    fn record(appointment_id: AppointmentId, status: PaymentStatus) -> PaymentCommand {
        RecordPayment {
            draft: PaymentDraft {
                appointment_id,
                amount: Decimal::new(150000, 2),
                method: PaymentMethod::Insurance,
                status,
            },
        }
        .into()
    }

    #[tokio::test]
    async fn test_record_then_settle_then_delete() {
        let store = MemoryStore::new();
        let appointment_id = seeded(&store).await;
        let mut tx = store.begin().await.unwrap();

        let outcome = execute(tx.as_mut(), record(appointment_id, PaymentStatus::Unpaid))
            .await
            .unwrap();
        assert_eq!(outcome.appointment.status, AppointmentStatus::Confirmed);
        let payment = outcome.payment.unwrap();

        let outcome = execute(
            tx.as_mut(),
            SettlePayment {
                current: payment.clone(),
            }
            .into(),
        )
        .await
        .unwrap();
        assert_eq!(outcome.appointment.status, AppointmentStatus::Completed);
        let settled = outcome.payment.unwrap();
        assert_eq!(settled.status, PaymentStatus::Paid);

        let outcome = execute(tx.as_mut(), DeletePayment { current: settled }.into())
            .await
            .unwrap();
        assert!(outcome.payment.is_none());
        assert_eq!(outcome.appointment.status, AppointmentStatus::Pending);
    }

    #[tokio::test]
    async fn test_failed_status_write_is_inconsistency() {
        let store = MemoryStore::new();
        let appointment_id = seeded(&store).await;
        let mut tx = store.begin().await.unwrap();

        store.fail_next_status_write();
        let err = execute(tx.as_mut(), record(appointment_id, PaymentStatus::Paid))
            .await
            .unwrap_err();
        assert!(matches!(err, ClinicError::Inconsistency(_)));
    }

    #[tokio::test]
    async fn test_lost_status_write_is_caught_on_read_back() {
        let store = MemoryStore::new();
        let appointment_id = seeded(&store).await;
        let mut tx = store.begin().await.unwrap();

        store.lose_next_status_write();
        let err = execute(tx.as_mut(), record(appointment_id, PaymentStatus::Unpaid))
            .await
            .unwrap_err();
        match err {
            ClinicError::Inconsistency(detail) => assert!(detail.contains("expected Confirmed")),
            other => panic!("expected inconsistency, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_appointment_is_not_found() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let err = execute(tx.as_mut(), record(AppointmentId::new(99), PaymentStatus::Unpaid))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClinicError::NotFound {
                entity: EntityKind::Appointment,
                id: 99
            }
        ));
    }
}
