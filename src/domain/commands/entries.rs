//! Commands and queries for one-off entries and range reads.

use super::DateArg;

/// Create a one-off entry for an owner.
#[derive(Debug, Clone)]
pub struct CreateEntryCommand {
    pub owner_id: String,
    pub name: String,
    pub amount: f64,
    pub currency: String,
    pub category: String,
    pub date: DateArg,
}

/// Replace the user-editable fields of an existing entry.
#[derive(Debug, Clone)]
pub struct UpdateEntryCommand {
    pub owner_id: String,
    pub entry_id: String,
    pub name: String,
    pub amount: f64,
    pub currency: String,
    pub category: String,
    pub date: DateArg,
}

/// Inclusive calendar-day window for listing or summarizing an owner's
/// financial events. Both bounds are required.
#[derive(Debug, Clone)]
pub struct RangeQuery {
    pub owner_id: String,
    pub start_date: DateArg,
    pub end_date: DateArg,
}
