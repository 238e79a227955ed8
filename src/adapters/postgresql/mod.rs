//! PostgreSQL store integration
//!
//! This module provides the durable backend for clinic records.

pub mod client;
pub mod models;
pub mod store;

pub use client::PostgreSQLClient;
pub use store::{PostgreSQLStore, PostgreSQLTransaction};
