//! Source of "today" for date rules and the dashboard

use crate::domain::{ClinicError, Result};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};

/// Supplies the clinic's current date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock evaluated at a fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Clock for a clinic `utc_offset_minutes` east of UTC
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::Configuration`] if the offset is a day or more.
    pub fn new(utc_offset_minutes: i32) -> Result<Self> {
        Ok(Self {
            offset: offset_from_minutes(utc_offset_minutes)?,
        })
    }

    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// Clock pinned to one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Convert a minute offset into a chrono offset
pub fn offset_from_minutes(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            ClinicError::Configuration(format!("UTC offset of {minutes} minutes is out of range"))
        })
}
