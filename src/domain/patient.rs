//! Patient records

use crate::domain::ids::PatientId;
use crate::domain::person::PersonName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| format!("Invalid gender '{s}'. Must be one of: Male, Female, Other"))
    }
}

/// A stored patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    #[serde(flatten)]
    pub name: PersonName,
    pub age: u8,
    pub gender: Gender,
    pub contact: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        self.name.full_name()
    }
}

/// Validated patient fields, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct PatientDraft {
    pub name: PersonName,
    pub age: u8,
    pub gender: Gender,
    pub contact: String,
    pub address: String,
}

/// Patient fields exactly as submitted by a caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_initial: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
}

impl From<&Patient> for PatientInput {
    fn from(patient: &Patient) -> Self {
        Self {
            first_name: Some(patient.name.first_name.clone()),
            last_name: Some(patient.name.last_name.clone()),
            middle_initial: patient.name.middle_initial.map(String::from),
            age: Some(i64::from(patient.age)),
            gender: Some(patient.gender.to_string()),
            contact: Some(patient.contact.clone()),
            address: Some(patient.address.clone()),
        }
    }
}
