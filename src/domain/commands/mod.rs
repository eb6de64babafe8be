//! Command and query structs consumed by the domain services.

pub mod entries;
pub mod recurrence;

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;

use crate::domain::dates;
use crate::domain::errors::DomainError;

/// A date input as accepted from callers: either a pre-parsed timestamp or
/// an ISO-8601 string still to be validated.
#[derive(Debug, Clone)]
pub enum DateArg {
    Timestamp(DateTime<FixedOffset>),
    Iso(String),
}

impl DateArg {
    /// Normalize into the owner's timezone, failing with a validation error
    /// for malformed strings.
    pub fn resolve(&self, tz: Tz) -> Result<DateTime<FixedOffset>, DomainError> {
        match self {
            DateArg::Timestamp(ts) => Ok(dates::localize(*ts, tz)),
            DateArg::Iso(raw) => dates::parse_datetime(raw, tz),
        }
    }
}

impl From<DateTime<FixedOffset>> for DateArg {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        DateArg::Timestamp(ts)
    }
}

impl From<&str> for DateArg {
    fn from(raw: &str) -> Self {
        DateArg::Iso(raw.to_string())
    }
}

impl From<String> for DateArg {
    fn from(raw: String) -> Self {
        DateArg::Iso(raw)
    }
}
