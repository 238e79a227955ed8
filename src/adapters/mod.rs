//! Storage integrations for the clinic core.
//!
//! - [`database`] - Store abstraction layer (trait-based) and backend factory
//! - [`postgresql`] - PostgreSQL implementation
//! - [`memory`] - In-memory implementation for tests and local trials
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind [`database::ClinicStore`] and
//! [`database::StoreTransaction`], so the workflow logic never sees a driver
//! type. Every write the core performs happens inside one transaction:
//!
//! ```rust
//! use frontdesk::adapters::database::{ClinicStore, PatientFilter};
//! use frontdesk::adapters::memory::MemoryStore;
//!
//! # async fn example() -> frontdesk::domain::Result<()> {
//! let store = MemoryStore::new();
//! let mut tx = store.begin().await?;
//! let patients = tx.list_patients(&PatientFilter::default()).await?;
//! tx.commit().await?;
//! assert!(patients.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod memory;
pub mod postgresql;
