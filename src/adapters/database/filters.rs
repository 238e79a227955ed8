//! Structured list filters
//!
//! Every field is optional; an unset field matches everything. Backends that
//! can push a filter down into a query do so, the in-memory backend calls
//! `matches` directly.

use crate::domain::{
    Appointment, AppointmentId, AppointmentStatus, Doctor, DoctorId, DoctorSpecialization, Patient,
    PatientId, Payment, PaymentStatus, PersonName,
};
use chrono::{NaiveDate, NaiveTime};

/// Patient list filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientFilter {
    /// Exact (first, last, middle initial) match
    pub name: Option<PersonName>,
    pub contact: Option<String>,
}

impl PatientFilter {
    pub fn with_name(mut self, name: PersonName) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    pub fn matches(&self, patient: &Patient) -> bool {
        self.name.as_ref().map_or(true, |n| *n == patient.name)
            && self.contact.as_ref().map_or(true, |c| *c == patient.contact)
    }
}

/// Doctor list filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctorFilter {
    pub name: Option<PersonName>,
    pub contact: Option<String>,
}

impl DoctorFilter {
    pub fn with_name(mut self, name: PersonName) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    pub fn matches(&self, doctor: &Doctor) -> bool {
        self.name.as_ref().map_or(true, |n| *n == doctor.name)
            && self.contact.as_ref().map_or(true, |c| *c == doctor.contact)
    }
}

/// Specialization list filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecializationFilter {
    pub doctor_id: Option<DoctorId>,
    /// Exact, case-sensitive label
    pub specialization: Option<String>,
}

impl SpecializationFilter {
    pub fn for_doctor(doctor_id: DoctorId) -> Self {
        Self {
            doctor_id: Some(doctor_id),
            specialization: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.specialization = Some(label.into());
        self
    }

    pub fn matches(&self, record: &DoctorSpecialization) -> bool {
        self.doctor_id.map_or(true, |id| id == record.doctor_id)
            && self
                .specialization
                .as_ref()
                .map_or(true, |label| *label == record.specialization)
    }
}

/// Appointment list filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub patient_id: Option<PatientId>,
    pub doctor_id: Option<DoctorId>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    /// Empty means any status
    pub statuses: Vec<AppointmentStatus>,
    /// Inclusive lower bound on the date
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the date
    pub date_to: Option<NaiveDate>,
}

impl AppointmentFilter {
    pub fn for_patient(patient_id: PatientId) -> Self {
        Self {
            patient_id: Some(patient_id),
            ..Self::default()
        }
    }

    pub fn for_doctor(doctor_id: DoctorId) -> Self {
        Self {
            doctor_id: Some(doctor_id),
            ..Self::default()
        }
    }

    /// Restrict to one exact date and time slot
    pub fn at_slot(mut self, date: NaiveDate, time: NaiveTime) -> Self {
        self.date = Some(date);
        self.time = Some(time);
        self
    }

    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn from_date(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn to_date(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = AppointmentStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.patient_id.map_or(true, |id| id == appointment.patient_id)
            && self.doctor_id.map_or(true, |id| id == appointment.doctor_id)
            && self.date.map_or(true, |d| d == appointment.appointment_date)
            && self.time.map_or(true, |t| t == appointment.appointment_time)
            && (self.statuses.is_empty() || self.statuses.contains(&appointment.status))
            && self
                .date_from
                .map_or(true, |d| appointment.appointment_date >= d)
            && self.date_to.map_or(true, |d| appointment.appointment_date <= d)
    }
}

/// Payment list filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentFilter {
    pub appointment_id: Option<AppointmentId>,
    pub status: Option<PaymentStatus>,
}

impl PaymentFilter {
    pub fn for_appointment(appointment_id: AppointmentId) -> Self {
        Self {
            appointment_id: Some(appointment_id),
            status: None,
        }
    }

    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, payment: &Payment) -> bool {
        self.appointment_id
            .map_or(true, |id| id == payment.appointment_id)
            && self.status.map_or(true, |s| s == payment.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn appointment(date: &str, time: &str, status: AppointmentStatus) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: AppointmentId::new(1),
            patient_id: PatientId::new(10),
            doctor_id: DoctorId::new(20),
            appointment_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            appointment_time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            purpose: "Checkup".to_string(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_default_filter_matches_everything() {
        let a = appointment("2030-01-02", "09:00", AppointmentStatus::Cancelled);
        assert!(AppointmentFilter::default().matches(&a));
    }

    #[test]
    fn test_slot_filter() {
        let a = appointment("2030-01-02", "09:00", AppointmentStatus::Pending);
        let date = NaiveDate::from_ymd_opt(2030, 1, 2).unwrap();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();

        assert!(AppointmentFilter::for_doctor(DoctorId::new(20))
            .at_slot(date, nine)
            .matches(&a));
        assert!(!AppointmentFilter::for_doctor(DoctorId::new(20))
            .at_slot(date, ten)
            .matches(&a));
        assert!(!AppointmentFilter::for_doctor(DoctorId::new(21))
            .at_slot(date, nine)
            .matches(&a));
    }

    #[test]
    fn test_status_and_range_filter() {
        let a = appointment("2030-01-02", "09:00", AppointmentStatus::Completed);
        let from = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();

        let open = AppointmentFilter::default()
            .from_date(from)
            .with_statuses([AppointmentStatus::Pending, AppointmentStatus::Confirmed]);
        assert!(!open.matches(&a));

        let any = AppointmentFilter::default().from_date(from);
        assert!(any.matches(&a));

        let before = AppointmentFilter::default().to_date(from);
        assert!(!before.matches(&a));
    }
}
