//! In-memory store
//!
//! Used by tests and for trying the CLI without a database
//! (`database_target = "memory"`).

pub mod store;

pub use store::{MemoryStore, MemoryTransaction};
