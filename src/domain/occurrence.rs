//! Occurrence generation: expanding a recurrence definition into dated
//! entries inside a window.
//!
//! The k-th occurrence is `advance(start, unit, k * interval)`, always
//! measured from the anchor rather than from the previous occurrence. That
//! keeps a monthly recurrence created on the 31st pinned to month-end:
//! stepping cumulatively would clamp to Feb 29 once and then drift to the
//! 29th for every later month.
//!
//! Occurrences are emitted from the definition's own start, never clipped to
//! a window start; callers that only want in-window results filter on their
//! side. The window end is inclusive, while the definition's `end_date` is
//! an exclusive bound.

use chrono::{DateTime, FixedOffset};

use crate::domain::models::entry::FinancialEntry;
use crate::domain::models::recurrence::RecurrenceDefinition;
use crate::domain::period::advance;

/// Lazily enumerate the occurrences of `definition` up to and including
/// `upper_bound`. Pure function of its inputs: iterating twice yields the
/// same sequence.
pub fn occurrences(
    definition: &RecurrenceDefinition,
    upper_bound: DateTime<FixedOffset>,
) -> Occurrences<'_> {
    Occurrences {
        definition,
        upper_bound,
        step: 0,
        exhausted: false,
    }
}

/// Iterator over the dated occurrences of one recurrence definition.
pub struct Occurrences<'a> {
    definition: &'a RecurrenceDefinition,
    upper_bound: DateTime<FixedOffset>,
    step: u32,
    exhausted: bool,
}

impl Iterator for Occurrences<'_> {
    type Item = FinancialEntry;

    fn next(&mut self) -> Option<FinancialEntry> {
        if self.exhausted {
            return None;
        }

        let Some(total) = self.step.checked_mul(self.definition.repeat_interval) else {
            self.exhausted = true;
            return None;
        };

        let date = advance(self.definition.start_date, self.definition.repeat_unit, total);

        if date > self.upper_bound {
            self.exhausted = true;
            return None;
        }

        if let Some(end) = self.definition.end_date {
            if date >= end {
                self.exhausted = true;
                return None;
            }
        }

        self.step += 1;
        Some(self.definition.occurrence_at(date))
    }
}
