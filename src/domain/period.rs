//! Period arithmetic for recurrence expansion.
//!
//! Pure date-advancing over the four supported units. Month and year steps
//! go through [`chrono::Months`], which clamps to the last valid day of the
//! target month, so Jan 31 + 1 month lands on Feb 28/29 rather than an
//! invalid date.

use chrono::{DateTime, Duration, FixedOffset, Months};

use crate::domain::models::recurrence::RepeatUnit;

/// Advance `ts` by `interval` units. The unit is validated at recurrence
/// creation, so this has no error conditions; an interval of 0 returns `ts`.
pub fn advance(ts: DateTime<FixedOffset>, unit: RepeatUnit, interval: u32) -> DateTime<FixedOffset> {
    match unit {
        RepeatUnit::Day => ts + Duration::days(i64::from(interval)),
        RepeatUnit::Week => ts + Duration::weeks(i64::from(interval)),
        RepeatUnit::Month => ts
            .checked_add_months(Months::new(interval))
            .expect("month arithmetic stays within the representable range"),
        RepeatUnit::Year => ts
            .checked_add_months(Months::new(interval.saturating_mul(12)))
            .expect("year arithmetic stays within the representable range"),
    }
}
