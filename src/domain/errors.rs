//! Domain error types
//!
//! This module defines the error hierarchy for the clinic core. Every fallible
//! operation returns [`ClinicError`]; storage backends report through
//! [`StoreError`] so third-party driver types never leak out of the adapters.

use crate::domain::ids::EntityKind;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Message shown to a user when the workflow invariant may be broken
pub const INCONSISTENCY_USER_MESSAGE: &str =
    "The operation could not be completed safely. Please contact the clinic administrator.";

/// Main clinic error type
#[derive(Debug, Error)]
pub enum ClinicError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// One or more field rules rejected the submitted values
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The addressed record does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    /// A delete was blocked by dependent records
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A paired workflow write failed after its primary write, or the
    /// appointment status read back does not match the planned transition
    #[error("Workflow inconsistency: {0}")]
    Inconsistency(String),

    /// Storage backend errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl ClinicError {
    /// Shorthand for a single-field validation failure
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        Self::Validation(errors)
    }

    pub fn not_found(entity: EntityKind, id: impl Into<i64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Whether the caller can fix this by changing the request
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound { .. } | Self::Conflict(_)
        )
    }

    /// Field errors, if this is a validation failure
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Text suitable for showing to a front-desk user
    ///
    /// Inconsistencies are reported generically; the detail goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            Self::Inconsistency(_) => INCONSISTENCY_USER_MESSAGE.to_string(),
            Self::NotFound { entity, id } => format!("No {entity} with ID {id} exists."),
            Self::Conflict(message) => message.clone(),
            Self::Validation(errors) => errors.to_string(),
            other => other.to_string(),
        }
    }
}

/// Storage backend errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not reach the backend
    #[error("Failed to connect to store: {0}")]
    ConnectionFailed(String),

    /// A read or write statement failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin/commit/rollback failed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// The backend rejected a write on a schema constraint
    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    /// The schema could not be created
    #[error("Schema setup failed: {0}")]
    SchemaFailed(String),

    /// A stored row could not be mapped back into a domain record
    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

/// A single rule violation attached to an input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every rule violation found for one submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Whether any error is attached to `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Messages attached to `field`, in the order they were found
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors
    pub fn into_result<T>(self, value: T) -> Result<T, ClinicError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(ClinicError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ClinicError {
    fn from(err: std::io::Error) -> Self {
        ClinicError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ClinicError {
    fn from(err: serde_json::Error) -> Self {
        ClinicError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ClinicError {
    fn from(err: toml::de::Error) -> Self {
        ClinicError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clinic_error_display() {
        let err = ClinicError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_not_found_display() {
        let err = ClinicError::not_found(EntityKind::Payment, 12);
        assert_eq!(err.to_string(), "payment 12 not found");
        assert!(err.is_rejection());
    }

    #[test]
    fn test_store_error_conversion() {
        let store_err = StoreError::QueryFailed("syntax".to_string());
        let err: ClinicError = store_err.into();
        assert!(matches!(err, ClinicError::Store(_)));
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_inconsistency_user_message_is_generic() {
        let err = ClinicError::Inconsistency("appointment 4 left Pending".to_string());
        assert_eq!(err.user_message(), INCONSISTENCY_USER_MESSAGE);
        assert!(err.to_string().contains("appointment 4"));
    }

    #[test]
    fn test_validation_errors_collect_all() {
        let mut errors = ValidationErrors::new();
        errors.add("age", "Age must be between 0 and 150.");
        errors.add("contact", "Contact is required.");
        errors.add("age", "Age must be a whole number.");

        assert_eq!(errors.len(), 3);
        assert!(errors.has_field("contact"));
        assert_eq!(errors.messages_for("age").len(), 2);
        assert!(errors.to_string().contains("contact: Contact is required."));
    }

    #[test]
    fn test_validation_errors_into_result() {
        let empty = ValidationErrors::new();
        assert_eq!(empty.into_result(5).unwrap(), 5);

        let err = ClinicError::validation("time", "bad").field_errors().cloned();
        assert!(err.is_some());
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: ClinicError = toml_err.into();
        assert!(matches!(err, ClinicError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: ClinicError = io_err.into();
        assert!(matches!(err, ClinicError::Io(_)));
    }
}
