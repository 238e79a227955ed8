//! Appointment operations

use super::ClinicCoordinator;
use crate::adapters::database::{AppointmentFilter, PaymentFilter, StoreTransaction};
use crate::core::validation::{validate_appointment, ValidatedAppointment, ValidationContext};
use crate::core::workflow::{initial_status, resolve_manual_status, StatusDecision};
use crate::domain::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentInput, AppointmentStatus,
    ClinicError, EntityKind, Result,
};

impl ClinicCoordinator {
    pub async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>> {
        let mut tx = self.store.begin().await?;
        let result = tx.list_appointments(filter).await;
        self.finish("list appointments", tx, result).await
    }

    pub async fn get_appointment(&self, id: AppointmentId) -> Result<Appointment> {
        let mut tx = self.store.begin().await?;
        let result = existing_appointment(tx.as_mut(), id).await;
        self.finish("get appointment", tx, result).await
    }

    /// Book an appointment
    ///
    /// New bookings start Pending. A request to book straight into Cancelled
    /// is honoured; any other submitted status is ignored.
    pub async fn create_appointment(&self, input: &AppointmentInput) -> Result<Appointment> {
        let ctx = self.validation_context();
        let mut tx = self.store.begin().await?;
        let result = create(tx.as_mut(), &ctx, input).await;
        let appointment = self.finish("book appointment", tx, result).await?;

        tracing::info!(
            appointment_id = %appointment.id,
            patient_id = %appointment.patient_id,
            doctor_id = %appointment.doctor_id,
            status = %appointment.status,
            "Appointment booked"
        );
        Ok(appointment)
    }

    /// Edit an appointment
    ///
    /// The only status a user may set is Cancelled, and only on a Pending or
    /// Confirmed appointment. Any other submitted status is dropped and the
    /// current one kept; this is not an error.
    pub async fn update_appointment(
        &self,
        id: AppointmentId,
        input: &AppointmentInput,
    ) -> Result<Appointment> {
        let ctx = self.validation_context();
        let mut tx = self.store.begin().await?;
        let result = update(tx.as_mut(), &ctx, id, input).await;
        let appointment = self.finish("update appointment", tx, result).await?;

        tracing::info!(appointment_id = %id, "Appointment updated");
        Ok(appointment)
    }

    /// Cancel a Pending or Confirmed appointment, leaving every other field
    pub async fn cancel_appointment(&self, id: AppointmentId) -> Result<Appointment> {
        let mut tx = self.store.begin().await?;
        let result = cancel(tx.as_mut(), id).await;
        let appointment = self.finish("cancel appointment", tx, result).await?;

        tracing::info!(appointment_id = %id, "Appointment cancelled");
        Ok(appointment)
    }

    /// Remove an appointment that has no payment
    pub async fn delete_appointment(&self, id: AppointmentId) -> Result<()> {
        let mut tx = self.store.begin().await?;
        let result = delete(tx.as_mut(), id).await;
        self.finish("delete appointment", tx, result).await?;

        tracing::info!(appointment_id = %id, "Appointment deleted");
        Ok(())
    }
}

pub(crate) async fn existing_appointment(
    tx: &mut dyn StoreTransaction,
    id: AppointmentId,
) -> Result<Appointment> {
    tx.get_appointment(id)
        .await?
        .ok_or_else(|| ClinicError::not_found(EntityKind::Appointment, id))
}

fn draft(validated: ValidatedAppointment, status: AppointmentStatus) -> AppointmentDraft {
    AppointmentDraft {
        patient_id: validated.patient_id,
        doctor_id: validated.doctor_id,
        appointment_date: validated.appointment_date,
        appointment_time: validated.appointment_time,
        purpose: validated.purpose,
        status,
    }
}

async fn create(
    tx: &mut dyn StoreTransaction,
    ctx: &ValidationContext,
    input: &AppointmentInput,
) -> Result<Appointment> {
    let validated = validate_appointment(tx, ctx, input, None).await?;

    let status = initial_status(validated.requested_status);
    if let Some(requested) = validated.requested_status.filter(|r| *r != status) {
        tracing::debug!(
            requested = %requested,
            stored = %status,
            "Requested status ignored for new appointment"
        );
    }

    tx.insert_appointment(&draft(validated, status)).await
}

async fn update(
    tx: &mut dyn StoreTransaction,
    ctx: &ValidationContext,
    id: AppointmentId,
    input: &AppointmentInput,
) -> Result<Appointment> {
    let current = existing_appointment(tx, id).await?;
    let validated = validate_appointment(tx, ctx, input, Some(id)).await?;

    let StatusDecision { status, discarded } =
        resolve_manual_status(current.status, validated.requested_status);
    if let Some(requested) = discarded {
        tracing::debug!(
            appointment_id = %id,
            current = %current.status,
            requested = %requested,
            "Manual status change not allowed, keeping current status"
        );
    }

    let updated = tx
        .update_appointment(id, &draft(validated, status))
        .await?
        .ok_or_else(|| ClinicError::not_found(EntityKind::Appointment, id))?;

    if updated.status != current.status {
        crate::log_status_transition!(id, current.status, updated.status, "manual update");
    }
    Ok(updated)
}

async fn cancel(tx: &mut dyn StoreTransaction, id: AppointmentId) -> Result<Appointment> {
    let current = existing_appointment(tx, id).await?;

    let decision = resolve_manual_status(current.status, Some(AppointmentStatus::Cancelled));
    if decision.discarded.is_some() {
        return Err(ClinicError::Conflict(format!(
            "Cannot cancel an appointment that is {}.",
            current.status
        )));
    }
    if current.status == AppointmentStatus::Cancelled {
        return Ok(current);
    }

    let cancelled = tx
        .set_appointment_status(id, AppointmentStatus::Cancelled)
        .await?
        .ok_or_else(|| ClinicError::not_found(EntityKind::Appointment, id))?;
    crate::log_status_transition!(id, current.status, cancelled.status, "manual cancel");
    Ok(cancelled)
}

async fn delete(tx: &mut dyn StoreTransaction, id: AppointmentId) -> Result<()> {
    existing_appointment(tx, id).await?;

    let payments = tx
        .list_payments(&PaymentFilter::for_appointment(id))
        .await?;
    if !payments.is_empty() {
        return Err(ClinicError::Conflict(
            "Cannot delete appointment with existing payment.".to_string(),
        ));
    }

    if !tx.delete_appointment(id).await? {
        return Err(ClinicError::not_found(EntityKind::Appointment, id));
    }
    Ok(())
}
