//! Store abstraction traits
//!
//! This module defines the traits that storage backends must implement to
//! hold clinic records. All reads and writes happen inside a
//! [`StoreTransaction`]; nothing is visible to other transactions until
//! `commit` returns.

use crate::adapters::database::filters::{
    AppointmentFilter, DoctorFilter, PatientFilter, PaymentFilter, SpecializationFilter,
};
use crate::domain::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentStatus, Doctor, DoctorDraft,
    DoctorId, DoctorSpecialization, Patient, PatientDraft, PatientId, Payment, PaymentDraft,
    PaymentId, Result, SpecializationDraft, SpecializationId,
};
use async_trait::async_trait;

/// Clinic record store
///
/// A store hands out transactions. Implementations must make each
/// transaction atomic and isolated from concurrent ones (serializable).
#[async_trait]
pub trait ClinicStore: Send + Sync {
    /// Test the store connection
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    /// Create tables and indexes if they do not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    async fn ensure_schema(&self) -> Result<()>;

    /// Start a unit of work
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or the transaction
    /// cannot be opened.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// One atomic unit of work against the store
///
/// `get_*`, `update_*` and `set_*` return `Ok(None)` and `delete_*` returns
/// `Ok(false)` when the id does not resolve; turning that into a NotFound
/// error is the caller's decision. Dropping a transaction without calling
/// `commit` discards its writes.
#[async_trait]
pub trait StoreTransaction: Send {
    // Patients

    async fn insert_patient(&mut self, draft: &PatientDraft) -> Result<Patient>;

    async fn get_patient(&mut self, id: PatientId) -> Result<Option<Patient>>;

    async fn update_patient(
        &mut self,
        id: PatientId,
        draft: &PatientDraft,
    ) -> Result<Option<Patient>>;

    async fn delete_patient(&mut self, id: PatientId) -> Result<bool>;

    /// Patients ordered by first name, then id
    async fn list_patients(&mut self, filter: &PatientFilter) -> Result<Vec<Patient>>;

    // Doctors

    async fn insert_doctor(&mut self, draft: &DoctorDraft) -> Result<Doctor>;

    async fn get_doctor(&mut self, id: DoctorId) -> Result<Option<Doctor>>;

    async fn update_doctor(&mut self, id: DoctorId, draft: &DoctorDraft)
        -> Result<Option<Doctor>>;

    /// Deletes the doctor and every specialization record it owns
    async fn delete_doctor(&mut self, id: DoctorId) -> Result<bool>;

    /// Doctors ordered by first name, then id
    async fn list_doctors(&mut self, filter: &DoctorFilter) -> Result<Vec<Doctor>>;

    // Specializations

    async fn insert_specialization(
        &mut self,
        draft: &SpecializationDraft,
    ) -> Result<DoctorSpecialization>;

    async fn get_specialization(
        &mut self,
        id: SpecializationId,
    ) -> Result<Option<DoctorSpecialization>>;

    async fn update_specialization(
        &mut self,
        id: SpecializationId,
        draft: &SpecializationDraft,
    ) -> Result<Option<DoctorSpecialization>>;

    async fn delete_specialization(&mut self, id: SpecializationId) -> Result<bool>;

    /// Removes every specialization of one doctor, returning how many went
    async fn delete_specializations_for_doctor(&mut self, doctor_id: DoctorId) -> Result<u64>;

    /// Specializations ordered by id
    async fn list_specializations(
        &mut self,
        filter: &SpecializationFilter,
    ) -> Result<Vec<DoctorSpecialization>>;

    // Appointments

    async fn insert_appointment(&mut self, draft: &AppointmentDraft) -> Result<Appointment>;

    async fn get_appointment(&mut self, id: AppointmentId) -> Result<Option<Appointment>>;

    async fn update_appointment(
        &mut self,
        id: AppointmentId,
        draft: &AppointmentDraft,
    ) -> Result<Option<Appointment>>;

    /// Writes only the status column
    async fn set_appointment_status(
        &mut self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>>;

    async fn delete_appointment(&mut self, id: AppointmentId) -> Result<bool>;

    /// Appointments ordered by date descending, then time descending, then id
    async fn list_appointments(&mut self, filter: &AppointmentFilter) -> Result<Vec<Appointment>>;

    // Payments

    async fn insert_payment(&mut self, draft: &PaymentDraft) -> Result<Payment>;

    async fn get_payment(&mut self, id: PaymentId) -> Result<Option<Payment>>;

    async fn update_payment(
        &mut self,
        id: PaymentId,
        draft: &PaymentDraft,
    ) -> Result<Option<Payment>>;

    async fn delete_payment(&mut self, id: PaymentId) -> Result<bool>;

    /// Payments ordered by creation time descending, then id descending
    async fn list_payments(&mut self, filter: &PaymentFilter) -> Result<Vec<Payment>>;

    // Lifecycle

    /// Make every write in this transaction durable
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the commit; nothing is applied.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discard every write in this transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}
