//! Doctor records and their specializations

use crate::domain::ids::{DoctorId, SpecializationId};
use crate::domain::person::PersonName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored doctor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    #[serde(flatten)]
    pub name: PersonName,
    pub contact: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    /// Display name with the `Dr.` prefix used on schedules
    pub fn display_name(&self) -> String {
        format!("Dr. {}", self.name.full_name())
    }
}

/// One specialization label attached to a doctor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorSpecialization {
    pub id: SpecializationId,
    pub doctor_id: DoctorId,
    pub specialization: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A doctor together with all of their specializations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub doctor: Doctor,
    pub specializations: Vec<DoctorSpecialization>,
}

impl DoctorProfile {
    /// Specialization labels in storage order
    pub fn labels(&self) -> Vec<&str> {
        self.specializations
            .iter()
            .map(|s| s.specialization.as_str())
            .collect()
    }
}

/// Validated doctor fields
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorDraft {
    pub name: PersonName,
    pub contact: String,
}

/// Validated doctor fields plus the trimmed, de-blanked specialization set
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorProfileDraft {
    pub doctor: DoctorDraft,
    pub specializations: Vec<String>,
}

/// Validated specialization fields
#[derive(Debug, Clone, PartialEq)]
pub struct SpecializationDraft {
    pub doctor_id: DoctorId,
    pub specialization: String,
}

/// Doctor fields exactly as submitted by a caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_initial: Option<String>,
    pub contact: Option<String>,
    #[serde(default)]
    pub specializations: Vec<String>,
}

impl From<&DoctorProfile> for DoctorInput {
    fn from(profile: &DoctorProfile) -> Self {
        let doctor = &profile.doctor;
        Self {
            first_name: Some(doctor.name.first_name.clone()),
            last_name: Some(doctor.name.last_name.clone()),
            middle_initial: doctor.name.middle_initial.map(String::from),
            contact: Some(doctor.contact.clone()),
            specializations: profile
                .specializations
                .iter()
                .map(|s| s.specialization.clone())
                .collect(),
        }
    }
}

/// Specialization fields exactly as submitted by a caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecializationInput {
    pub doctor_id: Option<i64>,
    pub specialization: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> DoctorProfile {
        let now = Utc::now();
        DoctorProfile {
            doctor: Doctor {
                id: DoctorId::new(3),
                name: PersonName::new("Bo", "Chen", None),
                contact: "555-0199".to_string(),
                created_at: now,
                updated_at: now,
            },
            specializations: vec![DoctorSpecialization {
                id: SpecializationId::new(9),
                doctor_id: DoctorId::new(3),
                specialization: "Cardiology".to_string(),
                created_at: now,
                updated_at: now,
            }],
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(profile().doctor.display_name(), "Dr. Bo Chen");
    }

    #[test]
    fn test_input_from_profile_carries_labels() {
        let input = DoctorInput::from(&profile());
        assert_eq!(input.specializations, vec!["Cardiology".to_string()]);
        assert!(input.middle_initial.is_none());
    }
}
