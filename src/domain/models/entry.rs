//! Domain model for a single dated financial entry.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Category tags recognized by the tracker. Anything else is folded into
/// `others` at creation time.
pub const CATEGORIES: [&str; 5] = ["entertainment", "food", "groceries", "payment", "others"];

/// A single dated monetary fact owned by one user.
///
/// `id` is an opaque identifier assigned by storage on insert; entries that
/// have not been persisted (including virtual occurrences expanded from a
/// recurrence definition) may carry the originating definition's id or none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialEntry {
    pub id: Option<String>,
    pub owner_id: String,
    pub name: String,
    pub amount: f64,
    pub currency: String,
    pub category: String,
    pub date: DateTime<FixedOffset>,
    /// True when this entry was produced from a recurrence definition,
    /// whether virtual or materialized.
    pub is_recurring: bool,
}

/// Fold a raw category tag into the recognized set, defaulting to `others`.
pub fn normalize_category(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    if CATEGORIES.contains(&lowered.as_str()) {
        lowered
    } else {
        "others".to_string()
    }
}
