//! Error context extension trait
//!
//! Like `anyhow::Context`, but keeps library code on [`ClinicError`]:
//!
//! ```rust
//! use frontdesk::domain::context::ResultExt;
//! use frontdesk::domain::Result;
//!
//! fn read_config(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_context(|| format!("Failed to read configuration file: {path}"))
//! }
//! # assert!(read_config("/definitely/not/here.toml").is_err());
//! ```

use crate::domain::errors::ClinicError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error (evaluated eagerly)
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context to an error, computing it only on failure
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

/// Rejections (validation, not-found, conflict) and inconsistencies pass
/// through untouched so callers can still match on them; everything else is
/// flattened into [`ClinicError::Other`] with the context prepended.
impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ClinicError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| wrap(e.into(), || context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| wrap(e.into(), f))
    }
}

fn wrap<C, F>(error: ClinicError, f: F) -> ClinicError
where
    C: std::fmt::Display,
    F: FnOnce() -> C,
{
    if error.is_rejection() || matches!(error, ClinicError::Inconsistency(_)) {
        return error;
    }
    ClinicError::Other(format!("{}: {error}", f()))
}
