//! Appointment records

use crate::domain::ids::{AppointmentId, DoctorId, PatientId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Purpose recorded when a booking does not give one
pub const DEFAULT_PURPOSE: &str = "General consultation";

/// Appointment status
///
/// Moves `Pending -> Confirmed -> Completed` as its payment is recorded and
/// settled. `Cancelled` is only ever set by an explicit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Whether the appointment still lies ahead in the schedule
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid appointment status '{s}'. Must be one of: Pending, Confirmed, Completed, Cancelled"
                )
            })
    }
}

/// A stored appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub purpose: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether this appointment occupies the given slot
    pub fn occupies(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.appointment_date == date && self.appointment_time == time
    }
}

/// Validated appointment fields
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDraft {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub purpose: String,
    pub status: AppointmentStatus,
}

/// Appointment fields exactly as submitted by a caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentInput {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub purpose: Option<String>,
    pub status: Option<String>,
}

impl From<&Appointment> for AppointmentInput {
    fn from(appointment: &Appointment) -> Self {
        Self {
            patient_id: Some(appointment.patient_id.value()),
            doctor_id: Some(appointment.doctor_id.value()),
            appointment_date: Some(appointment.appointment_date.format("%Y-%m-%d").to_string()),
            appointment_time: Some(appointment.appointment_time.format("%H:%M").to_string()),
            purpose: Some(appointment.purpose.clone()),
            status: Some(appointment.status.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(
            AppointmentStatus::from_str("Confirmed").unwrap(),
            AppointmentStatus::Confirmed
        );
        assert!(AppointmentStatus::from_str("Done").is_err());
        assert!(AppointmentStatus::from_str("pending").is_err());
    }

    #[test]
    fn test_status_default_is_pending() {
        assert_eq!(AppointmentStatus::default(), AppointmentStatus::Pending);
    }

    #[test]
    fn test_status_is_open() {
        assert!(AppointmentStatus::Pending.is_open());
        assert!(AppointmentStatus::Confirmed.is_open());
        assert!(!AppointmentStatus::Completed.is_open());
        assert!(!AppointmentStatus::Cancelled.is_open());
    }

    #[test]
    fn test_status_serializes_capitalized() {
        let json = serde_json::to_string(&AppointmentStatus::Cancelled).unwrap();
        assert_eq!(json, "\"Cancelled\"");
    }
}
