//! Patient operations

use super::ClinicCoordinator;
use crate::adapters::database::{AppointmentFilter, PatientFilter, StoreTransaction};
use crate::core::validation::validate_patient;
use crate::domain::{ClinicError, EntityKind, Patient, PatientId, PatientInput, Result};

impl ClinicCoordinator {
    pub async fn list_patients(&self, filter: &PatientFilter) -> Result<Vec<Patient>> {
        let mut tx = self.store.begin().await?;
        let result = tx.list_patients(filter).await;
        self.finish("list patients", tx, result).await
    }

    pub async fn get_patient(&self, id: PatientId) -> Result<Patient> {
        let mut tx = self.store.begin().await?;
        let result = existing_patient(tx.as_mut(), id).await;
        self.finish("get patient", tx, result).await
    }

    pub async fn create_patient(&self, input: &PatientInput) -> Result<Patient> {
        let mut tx = self.store.begin().await?;
        let result = create(tx.as_mut(), input).await;
        let patient = self.finish("create patient", tx, result).await?;

        tracing::info!(patient_id = %patient.id, "Patient registered");
        Ok(patient)
    }

    pub async fn update_patient(&self, id: PatientId, input: &PatientInput) -> Result<Patient> {
        let mut tx = self.store.begin().await?;
        let result = update(tx.as_mut(), id, input).await;
        let patient = self.finish("update patient", tx, result).await?;

        tracing::info!(patient_id = %patient.id, "Patient updated");
        Ok(patient)
    }

    /// Remove a patient who has no appointments
    pub async fn delete_patient(&self, id: PatientId) -> Result<()> {
        let mut tx = self.store.begin().await?;
        let result = delete(tx.as_mut(), id).await;
        self.finish("delete patient", tx, result).await?;

        tracing::info!(patient_id = %id, "Patient deleted");
        Ok(())
    }
}

pub(crate) async fn existing_patient(
    tx: &mut dyn StoreTransaction,
    id: PatientId,
) -> Result<Patient> {
    tx.get_patient(id)
        .await?
        .ok_or_else(|| ClinicError::not_found(EntityKind::Patient, id))
}

async fn create(tx: &mut dyn StoreTransaction, input: &PatientInput) -> Result<Patient> {
    let draft = validate_patient(tx, input, None).await?;
    tx.insert_patient(&draft).await
}

async fn update(
    tx: &mut dyn StoreTransaction,
    id: PatientId,
    input: &PatientInput,
) -> Result<Patient> {
    existing_patient(tx, id).await?;
    let draft = validate_patient(tx, input, Some(id)).await?;
    tx.update_patient(id, &draft)
        .await?
        .ok_or_else(|| ClinicError::not_found(EntityKind::Patient, id))
}

async fn delete(tx: &mut dyn StoreTransaction, id: PatientId) -> Result<()> {
    existing_patient(tx, id).await?;

    let booked = tx
        .list_appointments(&AppointmentFilter::for_patient(id))
        .await?;
    if !booked.is_empty() {
        return Err(ClinicError::Conflict(
            "Cannot delete patient with existing appointments.".to_string(),
        ));
    }

    if !tx.delete_patient(id).await? {
        return Err(ClinicError::not_found(EntityKind::Patient, id));
    }
    Ok(())
}
