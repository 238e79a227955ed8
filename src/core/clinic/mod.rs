//! Clinic coordinator
//!
//! [`ClinicCoordinator`] is the operation surface of the front desk. Each
//! operation runs in its own store transaction: validation reads, the
//! primary write and any workflow status change either all commit or all
//! roll back.
//!
//! # Example
//!
//! ```rust
//! use frontdesk::adapters::memory::MemoryStore;
//! use frontdesk::core::clinic::{ClinicCoordinator, SystemClock};
//! use frontdesk::domain::PatientInput;
//! use std::sync::Arc;
//!
//! # async fn example() -> frontdesk::domain::Result<()> {
//! let coordinator = ClinicCoordinator::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(SystemClock::utc()),
//! );
//!
//! let patient = coordinator
//!     .create_patient(&PatientInput {
//!         first_name: Some("Ann".into()),
//!         last_name: Some("Lee".into()),
//!         age: Some(31),
//!         gender: Some("Female".into()),
//!         contact: Some("555-0100".into()),
//!         address: Some("1 Orchard Lane, Springfield".into()),
//!         ..PatientInput::default()
//!     })
//!     .await?;
//! println!("Registered patient {}", patient.id);
//! # Ok(())
//! # }
//! ```

pub mod appointments;
pub mod clock;
pub mod dashboard;
pub mod doctors;
pub mod patients;
pub mod payments;

pub use clock::{offset_from_minutes, Clock, FixedClock, SystemClock};
pub use dashboard::DashboardSummary;

use crate::adapters::database::{ClinicStore, StoreTransaction};
use crate::config::ClinicSettings;
use crate::core::validation::ValidationContext;
use crate::domain::{ClinicError, Result, DEFAULT_PURPOSE};
use std::sync::Arc;

/// Front-desk operations over a clinic store
#[derive(Clone)]
pub struct ClinicCoordinator {
    store: Arc<dyn ClinicStore>,
    clock: Arc<dyn Clock>,
    default_purpose: String,
}

impl ClinicCoordinator {
    pub fn new(store: Arc<dyn ClinicStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            default_purpose: DEFAULT_PURPOSE.to_string(),
        }
    }

    /// Coordinator using the clinic's configured offset and booking defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configured UTC offset is out of range.
    pub fn from_settings(store: Arc<dyn ClinicStore>, settings: &ClinicSettings) -> Result<Self> {
        let clock = SystemClock::new(settings.utc_offset_minutes)?;
        Ok(Self::new(store, Arc::new(clock)).with_default_purpose(settings.default_purpose.clone()))
    }

    pub fn with_default_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.default_purpose = purpose.into();
        self
    }

    pub fn store(&self) -> &Arc<dyn ClinicStore> {
        &self.store
    }

    /// The clinic's current date
    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    fn validation_context(&self) -> ValidationContext {
        ValidationContext {
            today: self.clock.today(),
            default_purpose: self.default_purpose.clone(),
        }
    }

    /// Commit on success, roll back on failure
    ///
    /// Rejections are logged at info; other failures at error, except
    /// inconsistencies which the workflow engine has already reported.
    async fn finish<T>(
        &self,
        operation: &'static str,
        tx: Box<dyn StoreTransaction>,
        result: Result<T>,
    ) -> Result<T> {
        match result {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = tx.rollback().await {
                    tracing::warn!(
                        operation,
                        error = %rollback_error,
                        "Rollback failed"
                    );
                }
                if error.is_rejection() {
                    crate::log_rejection!(operation, &error);
                } else if !matches!(error, ClinicError::Inconsistency(_)) {
                    tracing::error!(operation, error = %error, "Operation failed");
                }
                Err(error)
            }
        }
    }
}
