//! In-memory store implementation
//!
//! Keeps every table in ordered maps behind one async mutex. A transaction
//! owns the lock for its whole lifetime and works on a staged copy that is
//! swapped in on commit, so transactions are serializable and atomic.
//! The same foreign-key and uniqueness rules as the SQL schema are enforced.

use crate::adapters::database::filters::{
    AppointmentFilter, DoctorFilter, PatientFilter, PaymentFilter, SpecializationFilter,
};
use crate::adapters::database::traits::{ClinicStore, StoreTransaction};
use crate::domain::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentStatus, Doctor, DoctorDraft,
    DoctorId, DoctorSpecialization, Patient, PatientDraft, PatientId, Payment, PaymentDraft,
    PaymentId, Result, SpecializationDraft, SpecializationId, StoreError,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
struct Sequences {
    patient: i64,
    doctor: i64,
    specialization: i64,
    appointment: i64,
    payment: i64,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    patients: BTreeMap<PatientId, Patient>,
    doctors: BTreeMap<DoctorId, Doctor>,
    specializations: BTreeMap<SpecializationId, DoctorSpecialization>,
    appointments: BTreeMap<AppointmentId, Appointment>,
    payments: BTreeMap<PaymentId, Payment>,
    seq: Sequences,
}

/// One-shot failure switches for exercising error paths
#[derive(Debug, Default)]
struct FaultPlan {
    fail_status_write: AtomicBool,
    lose_status_write: AtomicBool,
}

/// In-memory clinic store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<FaultPlan>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: the next appointment status write returns a store error
    #[doc(hidden)]
    pub fn fail_next_status_write(&self) {
        self.faults.fail_status_write.store(true, Ordering::SeqCst);
    }

    /// Test hook: the next appointment status write reports success but
    /// leaves the stored status untouched
    #[doc(hidden)]
    pub fn lose_next_status_write(&self) {
        self.faults.lose_status_write.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClinicStore for MemoryStore {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let guard = self.tables.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTransaction {
            guard,
            staged,
            faults: self.faults.clone(),
        }))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Transaction over the in-memory tables
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
    faults: Arc<FaultPlan>,
}

fn violation(constraint: &str) -> crate::domain::ClinicError {
    StoreError::ConstraintViolation(constraint.to_string()).into()
}

impl MemoryTransaction {
    fn check_patient_contact(&self, contact: &str, exclude: Option<PatientId>) -> Result<()> {
        let taken = self
            .staged
            .patients
            .values()
            .any(|p| p.contact == contact && Some(p.id) != exclude);
        if taken {
            return Err(violation("patients_contact_key"));
        }
        Ok(())
    }

    fn check_doctor_contact(&self, contact: &str, exclude: Option<DoctorId>) -> Result<()> {
        let taken = self
            .staged
            .doctors
            .values()
            .any(|d| d.contact == contact && Some(d.id) != exclude);
        if taken {
            return Err(violation("doctors_contact_key"));
        }
        Ok(())
    }

    fn check_specialization(
        &self,
        draft: &SpecializationDraft,
        exclude: Option<SpecializationId>,
    ) -> Result<()> {
        if !self.staged.doctors.contains_key(&draft.doctor_id) {
            return Err(violation("doctor_specializations_doctor_id_fkey"));
        }
        let taken = self.staged.specializations.values().any(|s| {
            s.doctor_id == draft.doctor_id
                && s.specialization == draft.specialization
                && Some(s.id) != exclude
        });
        if taken {
            return Err(violation("doctor_specializations_doctor_id_specialization_key"));
        }
        Ok(())
    }

    fn check_appointment(
        &self,
        draft: &AppointmentDraft,
        exclude: Option<AppointmentId>,
    ) -> Result<()> {
        if !self.staged.patients.contains_key(&draft.patient_id) {
            return Err(violation("appointments_patient_id_fkey"));
        }
        if !self.staged.doctors.contains_key(&draft.doctor_id) {
            return Err(violation("appointments_doctor_id_fkey"));
        }
        for other in self.staged.appointments.values() {
            if Some(other.id) == exclude
                || !other.occupies(draft.appointment_date, draft.appointment_time)
            {
                continue;
            }
            if other.doctor_id == draft.doctor_id {
                return Err(violation("appointments_doctor_slot_key"));
            }
            if other.patient_id == draft.patient_id {
                return Err(violation("appointments_patient_slot_key"));
            }
        }
        Ok(())
    }

    fn check_payment(&self, draft: &PaymentDraft, exclude: Option<PaymentId>) -> Result<()> {
        if !self.staged.appointments.contains_key(&draft.appointment_id) {
            return Err(violation("payments_appointment_id_fkey"));
        }
        let taken = self
            .staged
            .payments
            .values()
            .any(|p| p.appointment_id == draft.appointment_id && Some(p.id) != exclude);
        if taken {
            return Err(violation("payments_appointment_id_key"));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn insert_patient(&mut self, draft: &PatientDraft) -> Result<Patient> {
        self.check_patient_contact(&draft.contact, None)?;
        self.staged.seq.patient += 1;
        let now = Utc::now();
        let patient = Patient {
            id: PatientId::new(self.staged.seq.patient),
            name: draft.name.clone(),
            age: draft.age,
            gender: draft.gender,
            contact: draft.contact.clone(),
            address: draft.address.clone(),
            created_at: now,
            updated_at: now,
        };
        self.staged.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    async fn get_patient(&mut self, id: PatientId) -> Result<Option<Patient>> {
        Ok(self.staged.patients.get(&id).cloned())
    }

    async fn update_patient(
        &mut self,
        id: PatientId,
        draft: &PatientDraft,
    ) -> Result<Option<Patient>> {
        self.check_patient_contact(&draft.contact, Some(id))?;
        Ok(self.staged.patients.get_mut(&id).map(|patient| {
            patient.name = draft.name.clone();
            patient.age = draft.age;
            patient.gender = draft.gender;
            patient.contact = draft.contact.clone();
            patient.address = draft.address.clone();
            patient.updated_at = Utc::now();
            patient.clone()
        }))
    }

    async fn delete_patient(&mut self, id: PatientId) -> Result<bool> {
        if self
            .staged
            .appointments
            .values()
            .any(|a| a.patient_id == id)
        {
            return Err(violation("appointments_patient_id_fkey"));
        }
        Ok(self.staged.patients.remove(&id).is_some())
    }

    async fn list_patients(&mut self, filter: &PatientFilter) -> Result<Vec<Patient>> {
        let mut patients: Vec<Patient> = self
            .staged
            .patients
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        patients.sort_by(|a, b| {
            a.name
                .first_name
                .cmp(&b.name.first_name)
                .then(a.id.cmp(&b.id))
        });
        Ok(patients)
    }

    async fn insert_doctor(&mut self, draft: &DoctorDraft) -> Result<Doctor> {
        self.check_doctor_contact(&draft.contact, None)?;
        self.staged.seq.doctor += 1;
        let now = Utc::now();
        let doctor = Doctor {
            id: DoctorId::new(self.staged.seq.doctor),
            name: draft.name.clone(),
            contact: draft.contact.clone(),
            created_at: now,
            updated_at: now,
        };
        self.staged.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    async fn get_doctor(&mut self, id: DoctorId) -> Result<Option<Doctor>> {
        Ok(self.staged.doctors.get(&id).cloned())
    }

    async fn update_doctor(
        &mut self,
        id: DoctorId,
        draft: &DoctorDraft,
    ) -> Result<Option<Doctor>> {
        self.check_doctor_contact(&draft.contact, Some(id))?;
        Ok(self.staged.doctors.get_mut(&id).map(|doctor| {
            doctor.name = draft.name.clone();
            doctor.contact = draft.contact.clone();
            doctor.updated_at = Utc::now();
            doctor.clone()
        }))
    }

    async fn delete_doctor(&mut self, id: DoctorId) -> Result<bool> {
        if self.staged.appointments.values().any(|a| a.doctor_id == id) {
            return Err(violation("appointments_doctor_id_fkey"));
        }
        self.staged.specializations.retain(|_, s| s.doctor_id != id);
        Ok(self.staged.doctors.remove(&id).is_some())
    }

    async fn list_doctors(&mut self, filter: &DoctorFilter) -> Result<Vec<Doctor>> {
        let mut doctors: Vec<Doctor> = self
            .staged
            .doctors
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        doctors.sort_by(|a, b| {
            a.name
                .first_name
                .cmp(&b.name.first_name)
                .then(a.id.cmp(&b.id))
        });
        Ok(doctors)
    }

    async fn insert_specialization(
        &mut self,
        draft: &SpecializationDraft,
    ) -> Result<DoctorSpecialization> {
        self.check_specialization(draft, None)?;
        self.staged.seq.specialization += 1;
        let now = Utc::now();
        let record = DoctorSpecialization {
            id: SpecializationId::new(self.staged.seq.specialization),
            doctor_id: draft.doctor_id,
            specialization: draft.specialization.clone(),
            created_at: now,
            updated_at: now,
        };
        self.staged.specializations.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_specialization(
        &mut self,
        id: SpecializationId,
    ) -> Result<Option<DoctorSpecialization>> {
        Ok(self.staged.specializations.get(&id).cloned())
    }

    async fn update_specialization(
        &mut self,
        id: SpecializationId,
        draft: &SpecializationDraft,
    ) -> Result<Option<DoctorSpecialization>> {
        self.check_specialization(draft, Some(id))?;
        Ok(self.staged.specializations.get_mut(&id).map(|record| {
            record.doctor_id = draft.doctor_id;
            record.specialization = draft.specialization.clone();
            record.updated_at = Utc::now();
            record.clone()
        }))
    }

    async fn delete_specialization(&mut self, id: SpecializationId) -> Result<bool> {
        Ok(self.staged.specializations.remove(&id).is_some())
    }

    async fn delete_specializations_for_doctor(&mut self, doctor_id: DoctorId) -> Result<u64> {
        let before = self.staged.specializations.len();
        self.staged
            .specializations
            .retain(|_, s| s.doctor_id != doctor_id);
        Ok((before - self.staged.specializations.len()) as u64)
    }

    async fn list_specializations(
        &mut self,
        filter: &SpecializationFilter,
    ) -> Result<Vec<DoctorSpecialization>> {
        // BTreeMap iteration is already in id order
        Ok(self
            .staged
            .specializations
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    async fn insert_appointment(&mut self, draft: &AppointmentDraft) -> Result<Appointment> {
        self.check_appointment(draft, None)?;
        self.staged.seq.appointment += 1;
        let now = Utc::now();
        let appointment = Appointment {
            id: AppointmentId::new(self.staged.seq.appointment),
            patient_id: draft.patient_id,
            doctor_id: draft.doctor_id,
            appointment_date: draft.appointment_date,
            appointment_time: draft.appointment_time,
            purpose: draft.purpose.clone(),
            status: draft.status,
            created_at: now,
            updated_at: now,
        };
        self.staged
            .appointments
            .insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn get_appointment(&mut self, id: AppointmentId) -> Result<Option<Appointment>> {
        Ok(self.staged.appointments.get(&id).cloned())
    }

    async fn update_appointment(
        &mut self,
        id: AppointmentId,
        draft: &AppointmentDraft,
    ) -> Result<Option<Appointment>> {
        self.check_appointment(draft, Some(id))?;
        Ok(self.staged.appointments.get_mut(&id).map(|appointment| {
            appointment.patient_id = draft.patient_id;
            appointment.doctor_id = draft.doctor_id;
            appointment.appointment_date = draft.appointment_date;
            appointment.appointment_time = draft.appointment_time;
            appointment.purpose = draft.purpose.clone();
            appointment.status = draft.status;
            appointment.updated_at = Utc::now();
            appointment.clone()
        }))
    }

    async fn set_appointment_status(
        &mut self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>> {
        if self.faults.fail_status_write.swap(false, Ordering::SeqCst) {
            return Err(StoreError::QueryFailed(format!(
                "injected failure writing status of appointment {id}"
            ))
            .into());
        }
        if self.faults.lose_status_write.swap(false, Ordering::SeqCst) {
            return Ok(self.staged.appointments.get(&id).map(|stored| {
                let mut reported = stored.clone();
                reported.status = status;
                reported
            }));
        }

        Ok(self.staged.appointments.get_mut(&id).map(|appointment| {
            appointment.status = status;
            appointment.updated_at = Utc::now();
            appointment.clone()
        }))
    }

    async fn delete_appointment(&mut self, id: AppointmentId) -> Result<bool> {
        if self
            .staged
            .payments
            .values()
            .any(|p| p.appointment_id == id)
        {
            return Err(violation("payments_appointment_id_fkey"));
        }
        Ok(self.staged.appointments.remove(&id).is_some())
    }

    async fn list_appointments(&mut self, filter: &AppointmentFilter) -> Result<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .staged
            .appointments
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        appointments.sort_by(|a, b| {
            b.appointment_date
                .cmp(&a.appointment_date)
                .then(b.appointment_time.cmp(&a.appointment_time))
                .then(a.id.cmp(&b.id))
        });
        Ok(appointments)
    }

    async fn insert_payment(&mut self, draft: &PaymentDraft) -> Result<Payment> {
        self.check_payment(draft, None)?;
        self.staged.seq.payment += 1;
        let now = Utc::now();
        let payment = Payment {
            id: PaymentId::new(self.staged.seq.payment),
            appointment_id: draft.appointment_id,
            amount: draft.amount,
            method: draft.method,
            status: draft.status,
            created_at: now,
            updated_at: now,
        };
        self.staged.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn get_payment(&mut self, id: PaymentId) -> Result<Option<Payment>> {
        Ok(self.staged.payments.get(&id).cloned())
    }

    async fn update_payment(
        &mut self,
        id: PaymentId,
        draft: &PaymentDraft,
    ) -> Result<Option<Payment>> {
        self.check_payment(draft, Some(id))?;
        Ok(self.staged.payments.get_mut(&id).map(|payment| {
            payment.appointment_id = draft.appointment_id;
            payment.amount = draft.amount;
            payment.method = draft.method;
            payment.status = draft.status;
            payment.updated_at = Utc::now();
            payment.clone()
        }))
    }

    async fn delete_payment(&mut self, id: PaymentId) -> Result<bool> {
        Ok(self.staged.payments.remove(&id).is_some())
    }

    async fn list_payments(&mut self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .staged
            .payments
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        payments.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(payments)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTransaction {
            mut guard, staged, ..
        } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
