//! Integration tests for the payment-driven appointment workflow
//!
//! Runs the coordinator over the in-memory store with a fixed clinic date.

use chrono::NaiveDate;
use frontdesk::adapters::database::PaymentFilter;
use frontdesk::adapters::memory::MemoryStore;
use frontdesk::core::clinic::{ClinicCoordinator, FixedClock};
use frontdesk::domain::{
    Appointment, AppointmentId, AppointmentInput, AppointmentStatus, ClinicError, DoctorInput,
    PatientInput, Payment, PaymentInput, PaymentStatus,
};
use std::sync::Arc;

struct Clinic {
    store: MemoryStore,
    coordinator: ClinicCoordinator,
}

fn clinic() -> Clinic {
    let store = MemoryStore::new();
    let today = NaiveDate::from_ymd_opt(2030, 5, 20).unwrap();
    let coordinator = ClinicCoordinator::new(Arc::new(store.clone()), Arc::new(FixedClock(today)));
    Clinic { store, coordinator }
}

/// Registers one patient and one doctor and books them at 09:00 on 2030-06-01
async fn booked(clinic: &Clinic) -> Appointment {
    let patient = clinic
        .coordinator
        .create_patient(&PatientInput {
            first_name: Some("Ann".to_string()),
            last_name: Some("Lee".to_string()),
            age: Some(34),
            gender: Some("Female".to_string()),
            contact: Some("555-0100".to_string()),
            address: Some("12 Harbour Road, Kowloon".to_string()),
            ..PatientInput::default()
        })
        .await
        .unwrap();
    let doctor = clinic
        .coordinator
        .create_doctor(&DoctorInput {
            first_name: Some("Bo".to_string()),
            last_name: Some("Chen".to_string()),
            contact: Some("555-0200".to_string()),
            specializations: vec!["Cardiology".to_string()],
            ..DoctorInput::default()
        })
        .await
        .unwrap();

    clinic
        .coordinator
        .create_appointment(&AppointmentInput {
            patient_id: Some(patient.id.value()),
            doctor_id: Some(doctor.doctor.id.value()),
            appointment_date: Some("2030-06-01".to_string()),
            appointment_time: Some("09:00".to_string()),
            purpose: Some("Follow-up".to_string()),
            status: None,
        })
        .await
        .unwrap()
}

fn payment_input(appointment_id: AppointmentId, status: Option<&str>) -> PaymentInput {
    PaymentInput {
        appointment_id: Some(appointment_id.value()),
        amount: Some("150.00".to_string()),
        method: Some("Cash".to_string()),
        status: status.map(str::to_string),
    }
}

async fn status_of(clinic: &Clinic, id: AppointmentId) -> AppointmentStatus {
    clinic.coordinator.get_appointment(id).await.unwrap().status
}

async fn payments(clinic: &Clinic) -> Vec<Payment> {
    clinic
        .coordinator
        .list_payments(&PaymentFilter::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_booking_starts_pending() {
    let clinic = clinic();
    let appointment = booked(&clinic).await;
    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.purpose, "Follow-up");
}

#[tokio::test]
async fn test_full_payment_lifecycle() {
    let clinic = clinic();
    let appointment = booked(&clinic).await;

    let payment = clinic
        .coordinator
        .create_payment(&payment_input(appointment.id, None))
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Unpaid);
    assert_eq!(payment.amount.to_string(), "150.00");
    assert_eq!(status_of(&clinic, appointment.id).await, AppointmentStatus::Confirmed);

    let paid = clinic.coordinator.mark_paid(payment.id).await.unwrap();
    assert_eq!(paid.status, PaymentStatus::Paid);
    assert_eq!(status_of(&clinic, appointment.id).await, AppointmentStatus::Completed);

    let reverted = clinic
        .coordinator
        .update_payment(payment.id, &payment_input(appointment.id, Some("Unpaid")))
        .await
        .unwrap();
    assert_eq!(reverted.status, PaymentStatus::Unpaid);
    assert_eq!(status_of(&clinic, appointment.id).await, AppointmentStatus::Confirmed);

    clinic.coordinator.mark_paid(payment.id).await.unwrap();
    clinic.coordinator.delete_payment(payment.id).await.unwrap();
    assert_eq!(status_of(&clinic, appointment.id).await, AppointmentStatus::Pending);
    assert!(payments(&clinic).await.is_empty());
}

#[tokio::test]
async fn test_paid_payment_on_pending_appointment_completes_it() {
    let clinic = clinic();
    let appointment = booked(&clinic).await;

    clinic
        .coordinator
        .create_payment(&payment_input(appointment.id, Some("Paid")))
        .await
        .unwrap();

    assert_eq!(status_of(&clinic, appointment.id).await, AppointmentStatus::Completed);
}

#[tokio::test]
async fn test_reverting_paid_payment_reopens_appointment() {
    let clinic = clinic();
    let appointment = booked(&clinic).await;
    let payment = clinic
        .coordinator
        .create_payment(&payment_input(appointment.id, Some("Paid")))
        .await
        .unwrap();
    assert_eq!(status_of(&clinic, appointment.id).await, AppointmentStatus::Completed);

    let reverted = clinic
        .coordinator
        .update_payment(payment.id, &payment_input(appointment.id, Some("Unpaid")))
        .await
        .unwrap();

    assert_eq!(reverted.status, PaymentStatus::Unpaid);
    assert_eq!(status_of(&clinic, appointment.id).await, AppointmentStatus::Confirmed);
    let stored = clinic.coordinator.get_payment(payment.id).await.unwrap();
    assert_eq!(stored.status, PaymentStatus::Unpaid);
}

#[tokio::test]
async fn test_settling_payment_completes_cancelled_appointment() {
    let clinic = clinic();
    let appointment = booked(&clinic).await;
    let cancelled = clinic
        .coordinator
        .cancel_appointment(appointment.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    let payment = clinic
        .coordinator
        .create_payment(&payment_input(appointment.id, Some("Paid")))
        .await
        .unwrap();
    assert_eq!(status_of(&clinic, appointment.id).await, AppointmentStatus::Cancelled);

    clinic.coordinator.mark_paid(payment.id).await.unwrap();

    assert_eq!(status_of(&clinic, appointment.id).await, AppointmentStatus::Completed);
}

#[tokio::test]
async fn test_deleting_unpaid_payment_keeps_status() {
    let clinic = clinic();
    let appointment = booked(&clinic).await;
    let payment = clinic
        .coordinator
        .create_payment(&payment_input(appointment.id, None))
        .await
        .unwrap();

    clinic.coordinator.delete_payment(payment.id).await.unwrap();

    assert_eq!(status_of(&clinic, appointment.id).await, AppointmentStatus::Confirmed);
}

#[tokio::test]
async fn test_update_without_status_keeps_payment_status() {
    let clinic = clinic();
    let appointment = booked(&clinic).await;
    let payment = clinic
        .coordinator
        .create_payment(&payment_input(appointment.id, Some("Paid")))
        .await
        .unwrap();

    let mut input = payment_input(appointment.id, None);
    input.amount = Some("175.5".to_string());
    let updated = clinic
        .coordinator
        .update_payment(payment.id, &input)
        .await
        .unwrap();

    assert_eq!(updated.status, PaymentStatus::Paid);
    assert_eq!(updated.amount.to_string(), "175.50");
    assert_eq!(status_of(&clinic, appointment.id).await, AppointmentStatus::Completed);
}

#[tokio::test]
async fn test_manual_confirm_is_ignored() {
    let clinic = clinic();
    let appointment = booked(&clinic).await;

    let updated = clinic
        .coordinator
        .update_appointment(
            appointment.id,
            &AppointmentInput {
                patient_id: Some(appointment.patient_id.value()),
                doctor_id: Some(appointment.doctor_id.value()),
                appointment_date: Some("2030-06-01".to_string()),
                appointment_time: Some("10:30".to_string()),
                purpose: Some("Follow-up".to_string()),
                status: Some("Confirmed".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, AppointmentStatus::Pending);
    assert_eq!(updated.appointment_time.to_string(), "10:30:00");
}

#[tokio::test]
async fn test_reschedule_accepts_time_with_seconds() {
    let clinic = clinic();
    let appointment = booked(&clinic).await;
    let mut input = AppointmentInput::from(&appointment);
    input.appointment_time = Some("10:30:15".to_string());

    let updated = clinic
        .coordinator
        .update_appointment(appointment.id, &input)
        .await
        .unwrap();

    assert_eq!(updated.appointment_time.to_string(), "10:30:15");
    assert_eq!(updated.status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn test_cancel_then_cancel_again() {
    let clinic = clinic();
    let appointment = booked(&clinic).await;

    let cancelled = clinic
        .coordinator
        .cancel_appointment(appointment.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    let again = clinic
        .coordinator
        .cancel_appointment(appointment.id)
        .await
        .unwrap();
    assert_eq!(again.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_completed_appointment_is_conflict() {
    let clinic = clinic();
    let appointment = booked(&clinic).await;
    clinic
        .coordinator
        .create_payment(&payment_input(appointment.id, Some("Paid")))
        .await
        .unwrap();

    let err = clinic
        .coordinator
        .cancel_appointment(appointment.id)
        .await
        .unwrap_err();

    assert!(matches!(err, ClinicError::Conflict(_)));
    assert_eq!(status_of(&clinic, appointment.id).await, AppointmentStatus::Completed);
}

#[tokio::test]
async fn test_second_payment_for_appointment_rejected() {
    let clinic = clinic();
    let appointment = booked(&clinic).await;
    clinic
        .coordinator
        .create_payment(&payment_input(appointment.id, None))
        .await
        .unwrap();

    let err = clinic
        .coordinator
        .create_payment(&payment_input(appointment.id, None))
        .await
        .unwrap_err();

    let errors = err.field_errors().unwrap();
    assert_eq!(
        errors.messages_for("appointment_id"),
        vec!["A payment already exists for this appointment."]
    );
    assert_eq!(payments(&clinic).await.len(), 1);
}

#[tokio::test]
async fn test_failed_status_write_rolls_back_payment() {
    let clinic = clinic();
    let appointment = booked(&clinic).await;

    clinic.store.fail_next_status_write();
    let err = clinic
        .coordinator
        .create_payment(&payment_input(appointment.id, None))
        .await
        .unwrap_err();

    assert!(matches!(err, ClinicError::Inconsistency(_)));
    assert!(!err.is_rejection());
    assert!(payments(&clinic).await.is_empty());
    assert_eq!(status_of(&clinic, appointment.id).await, AppointmentStatus::Pending);
}

#[tokio::test]
async fn test_lost_status_write_rolls_back_settlement() {
    let clinic = clinic();
    let appointment = booked(&clinic).await;
    let payment = clinic
        .coordinator
        .create_payment(&payment_input(appointment.id, None))
        .await
        .unwrap();

    clinic.store.lose_next_status_write();
    let err = clinic.coordinator.mark_paid(payment.id).await.unwrap_err();

    assert!(matches!(err, ClinicError::Inconsistency(ref detail) if detail.contains("expected Completed")));
    let stored = clinic.coordinator.get_payment(payment.id).await.unwrap();
    assert_eq!(stored.status, PaymentStatus::Unpaid);
    assert_eq!(status_of(&clinic, appointment.id).await, AppointmentStatus::Confirmed);
}

#[tokio::test]
async fn test_failed_status_write_keeps_deleted_payment() {
    let clinic = clinic();
    let appointment = booked(&clinic).await;
    let payment = clinic
        .coordinator
        .create_payment(&payment_input(appointment.id, Some("Paid")))
        .await
        .unwrap();

    clinic.store.fail_next_status_write();
    let err = clinic.coordinator.delete_payment(payment.id).await.unwrap_err();

    assert!(matches!(err, ClinicError::Inconsistency(_)));
    assert_eq!(payments(&clinic).await.len(), 1);
    assert_eq!(status_of(&clinic, appointment.id).await, AppointmentStatus::Completed);
}
