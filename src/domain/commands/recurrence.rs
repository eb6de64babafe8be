//! Commands for the recurrence lifecycle.
//!
//! Repeat period and interval arrive as raw strings, exactly as a transport
//! layer would hand them over; the lifecycle manager validates both before
//! anything is persisted.

use super::DateArg;

/// Create a new recurrence definition anchored at `start_date`.
#[derive(Debug, Clone)]
pub struct CreateRecurrenceCommand {
    pub owner_id: String,
    pub name: String,
    pub amount: f64,
    pub currency: String,
    pub category: String,
    pub start_date: DateArg,
    /// One of `day`, `week`, `month`, `year`.
    pub repeat_period: String,
    /// Positive integer, "every N units".
    pub repeat_value: String,
}

/// Replacement attributes applied from the effective date of a split.
#[derive(Debug, Clone)]
pub struct RecurrenceAttributes {
    pub name: String,
    pub amount: f64,
    pub currency: String,
    pub category: String,
    pub repeat_period: String,
    pub repeat_value: String,
}

/// Close an existing definition the day before `effective_date` and open a
/// replacement with `attributes` from `effective_date` on.
#[derive(Debug, Clone)]
pub struct SplitRecurrenceCommand {
    pub owner_id: String,
    pub recurrence_id: String,
    pub attributes: RecurrenceAttributes,
    pub effective_date: DateArg,
}

/// Stop generating occurrences at `pause_date` without a replacement.
#[derive(Debug, Clone)]
pub struct PauseRecurrenceCommand {
    pub owner_id: String,
    pub recurrence_id: String,
    pub pause_date: DateArg,
}

/// Permanently remove a definition and its unrendered future occurrences.
#[derive(Debug, Clone)]
pub struct DeleteRecurrenceCommand {
    pub owner_id: String,
    pub recurrence_id: String,
}
