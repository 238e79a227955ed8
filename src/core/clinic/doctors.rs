//! Doctor and specialization operations
//!
//! A doctor is always read and written together with its specialization set.
//! Editing a doctor replaces the whole set; single labels can also be managed
//! on their own, as long as the doctor keeps at least one.

use super::ClinicCoordinator;
use crate::adapters::database::{
    AppointmentFilter, DoctorFilter, SpecializationFilter, StoreTransaction,
};
use crate::core::validation::{validate_doctor, validate_specialization};
use crate::domain::{
    ClinicError, DoctorId, DoctorInput, DoctorProfile, DoctorProfileDraft, DoctorSpecialization,
    EntityKind, Result, SpecializationDraft, SpecializationId, SpecializationInput,
};
use std::collections::HashMap;

impl ClinicCoordinator {
    /// Doctors with their specializations, in doctor list order
    pub async fn list_doctors(&self, filter: &DoctorFilter) -> Result<Vec<DoctorProfile>> {
        let mut tx = self.store.begin().await?;
        let result = list_profiles(tx.as_mut(), filter).await;
        self.finish("list doctors", tx, result).await
    }

    pub async fn get_doctor(&self, id: DoctorId) -> Result<DoctorProfile> {
        let mut tx = self.store.begin().await?;
        let result = existing_profile(tx.as_mut(), id).await;
        self.finish("get doctor", tx, result).await
    }

    pub async fn create_doctor(&self, input: &DoctorInput) -> Result<DoctorProfile> {
        let mut tx = self.store.begin().await?;
        let result = create_doctor(tx.as_mut(), input).await;
        let profile = self.finish("create doctor", tx, result).await?;

        tracing::info!(
            doctor_id = %profile.doctor.id,
            specializations = profile.specializations.len(),
            "Doctor registered"
        );
        Ok(profile)
    }

    /// Replace a doctor's fields and whole specialization set
    pub async fn update_doctor(&self, id: DoctorId, input: &DoctorInput) -> Result<DoctorProfile> {
        let mut tx = self.store.begin().await?;
        let result = update_doctor(tx.as_mut(), id, input).await;
        let profile = self.finish("update doctor", tx, result).await?;

        tracing::info!(
            doctor_id = %id,
            specializations = profile.specializations.len(),
            "Doctor updated"
        );
        Ok(profile)
    }

    /// Remove a doctor with no appointments, together with its specializations
    pub async fn delete_doctor(&self, id: DoctorId) -> Result<()> {
        let mut tx = self.store.begin().await?;
        let result = delete_doctor(tx.as_mut(), id).await;
        self.finish("delete doctor", tx, result).await?;

        tracing::info!(doctor_id = %id, "Doctor deleted");
        Ok(())
    }

    pub async fn list_specializations(
        &self,
        filter: &SpecializationFilter,
    ) -> Result<Vec<DoctorSpecialization>> {
        let mut tx = self.store.begin().await?;
        let result = tx.list_specializations(filter).await;
        self.finish("list specializations", tx, result).await
    }

    pub async fn get_specialization(&self, id: SpecializationId) -> Result<DoctorSpecialization> {
        let mut tx = self.store.begin().await?;
        let result = existing_specialization(tx.as_mut(), id).await;
        self.finish("get specialization", tx, result).await
    }

    pub async fn create_specialization(
        &self,
        input: &SpecializationInput,
    ) -> Result<DoctorSpecialization> {
        let mut tx = self.store.begin().await?;
        let result = create_specialization(tx.as_mut(), input).await;
        let record = self.finish("create specialization", tx, result).await?;

        tracing::info!(
            specialization_id = %record.id,
            doctor_id = %record.doctor_id,
            "Specialization added"
        );
        Ok(record)
    }

    pub async fn update_specialization(
        &self,
        id: SpecializationId,
        input: &SpecializationInput,
    ) -> Result<DoctorSpecialization> {
        let mut tx = self.store.begin().await?;
        let result = update_specialization(tx.as_mut(), id, input).await;
        let record = self.finish("update specialization", tx, result).await?;

        tracing::info!(specialization_id = %id, "Specialization updated");
        Ok(record)
    }

    /// Remove one label; a doctor's last specialization cannot be removed
    pub async fn delete_specialization(&self, id: SpecializationId) -> Result<()> {
        let mut tx = self.store.begin().await?;
        let result = delete_specialization(tx.as_mut(), id).await;
        self.finish("delete specialization", tx, result).await?;

        tracing::info!(specialization_id = %id, "Specialization deleted");
        Ok(())
    }
}

async fn existing_profile(tx: &mut dyn StoreTransaction, id: DoctorId) -> Result<DoctorProfile> {
    let doctor = tx
        .get_doctor(id)
        .await?
        .ok_or_else(|| ClinicError::not_found(EntityKind::Doctor, id))?;
    let specializations = tx
        .list_specializations(&SpecializationFilter::for_doctor(id))
        .await?;
    Ok(DoctorProfile {
        doctor,
        specializations,
    })
}

async fn existing_specialization(
    tx: &mut dyn StoreTransaction,
    id: SpecializationId,
) -> Result<DoctorSpecialization> {
    tx.get_specialization(id)
        .await?
        .ok_or_else(|| ClinicError::not_found(EntityKind::Specialization, id))
}

async fn list_profiles(
    tx: &mut dyn StoreTransaction,
    filter: &DoctorFilter,
) -> Result<Vec<DoctorProfile>> {
    let doctors = tx.list_doctors(filter).await?;

    let mut by_doctor: HashMap<DoctorId, Vec<DoctorSpecialization>> = HashMap::new();
    for record in tx
        .list_specializations(&SpecializationFilter::default())
        .await?
    {
        by_doctor.entry(record.doctor_id).or_default().push(record);
    }

    Ok(doctors
        .into_iter()
        .map(|doctor| DoctorProfile {
            specializations: by_doctor.remove(&doctor.id).unwrap_or_default(),
            doctor,
        })
        .collect())
}

/// Write every label of a validated set for one doctor
async fn insert_labels(
    tx: &mut dyn StoreTransaction,
    doctor_id: DoctorId,
    labels: Vec<String>,
) -> Result<Vec<DoctorSpecialization>> {
    let mut records = Vec::with_capacity(labels.len());
    for specialization in labels {
        let draft = SpecializationDraft {
            doctor_id,
            specialization,
        };
        records.push(tx.insert_specialization(&draft).await?);
    }
    Ok(records)
}

async fn create_doctor(tx: &mut dyn StoreTransaction, input: &DoctorInput) -> Result<DoctorProfile> {
    let DoctorProfileDraft {
        doctor,
        specializations,
    } = validate_doctor(tx, input, None).await?;

    let doctor = tx.insert_doctor(&doctor).await?;
    let specializations = insert_labels(tx, doctor.id, specializations).await?;
    Ok(DoctorProfile {
        doctor,
        specializations,
    })
}

async fn update_doctor(
    tx: &mut dyn StoreTransaction,
    id: DoctorId,
    input: &DoctorInput,
) -> Result<DoctorProfile> {
    existing_profile(tx, id).await?;
    let DoctorProfileDraft {
        doctor,
        specializations,
    } = validate_doctor(tx, input, Some(id)).await?;

    let doctor = tx
        .update_doctor(id, &doctor)
        .await?
        .ok_or_else(|| ClinicError::not_found(EntityKind::Doctor, id))?;
    let removed = tx.delete_specializations_for_doctor(id).await?;
    let specializations = insert_labels(tx, id, specializations).await?;

    tracing::debug!(
        doctor_id = %id,
        removed,
        added = specializations.len(),
        "Specialization set replaced"
    );
    Ok(DoctorProfile {
        doctor,
        specializations,
    })
}

async fn delete_doctor(tx: &mut dyn StoreTransaction, id: DoctorId) -> Result<()> {
    existing_profile(tx, id).await?;

    let booked = tx.list_appointments(&AppointmentFilter::for_doctor(id)).await?;
    if !booked.is_empty() {
        return Err(ClinicError::Conflict(
            "Cannot delete doctor with existing appointments.".to_string(),
        ));
    }

    if !tx.delete_doctor(id).await? {
        return Err(ClinicError::not_found(EntityKind::Doctor, id));
    }
    Ok(())
}

async fn create_specialization(
    tx: &mut dyn StoreTransaction,
    input: &SpecializationInput,
) -> Result<DoctorSpecialization> {
    let draft = validate_specialization(tx, input, None).await?;
    tx.insert_specialization(&draft).await
}

async fn update_specialization(
    tx: &mut dyn StoreTransaction,
    id: SpecializationId,
    input: &SpecializationInput,
) -> Result<DoctorSpecialization> {
    let current = existing_specialization(tx, id).await?;
    let draft = validate_specialization(tx, input, Some(id)).await?;

    // Moving the label away must not leave the old doctor without any
    if draft.doctor_id != current.doctor_id {
        ensure_not_last(tx, &current).await?;
    }

    tx.update_specialization(id, &draft)
        .await?
        .ok_or_else(|| ClinicError::not_found(EntityKind::Specialization, id))
}

async fn delete_specialization(tx: &mut dyn StoreTransaction, id: SpecializationId) -> Result<()> {
    let current = existing_specialization(tx, id).await?;
    ensure_not_last(tx, &current).await?;

    if !tx.delete_specialization(id).await? {
        return Err(ClinicError::not_found(EntityKind::Specialization, id));
    }
    Ok(())
}

async fn ensure_not_last(
    tx: &mut dyn StoreTransaction,
    record: &DoctorSpecialization,
) -> Result<()> {
    let held = tx
        .list_specializations(&SpecializationFilter::for_doctor(record.doctor_id))
        .await?;
    if held.len() <= 1 {
        return Err(ClinicError::Conflict(
            "Cannot remove a doctor's only specialization.".to_string(),
        ));
    }
    Ok(())
}
