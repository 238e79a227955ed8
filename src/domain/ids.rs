//! Domain identifier types
//!
//! Every entity is addressed by an opaque integer handle. Each entity gets its
//! own newtype so a `PatientId` can never be passed where a `DoctorId` is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares an integer-backed identifier newtype with the usual conversions.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier value
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw identifier value
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let id: i64 = s
                    .trim()
                    .parse()
                    .map_err(|_| format!("Invalid {} ID: '{}'", $label, s))?;
                if id <= 0 {
                    return Err(format!("{} ID must be positive, got {}", $label, id));
                }
                Ok(Self(id))
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

entity_id!(
    /// Patient identifier
    PatientId,
    "patient"
);

entity_id!(
    /// Doctor identifier
    DoctorId,
    "doctor"
);

entity_id!(
    /// Doctor specialization record identifier
    SpecializationId,
    "specialization"
);

entity_id!(
    /// Appointment identifier
    AppointmentId,
    "appointment"
);

entity_id!(
    /// Payment identifier
    PaymentId,
    "payment"
);

/// The five kinds of record the clinic keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Patient,
    Doctor,
    Specialization,
    Appointment,
    Payment,
}

impl EntityKind {
    /// Human-readable name used in messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Specialization => "specialization",
            Self::Appointment => "appointment",
            Self::Payment => "payment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
