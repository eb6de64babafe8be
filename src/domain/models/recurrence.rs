//! Domain model for a recurrence ("subscription") definition.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::entry::FinancialEntry;

/// Unit of the recurrence period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatUnit {
    Day,
    Week,
    Month,
    Year,
}

impl RepeatUnit {
    /// Parse a repeat period tag as received from a caller. Returns `None`
    /// for anything outside the four recognized values.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "day" => Some(RepeatUnit::Day),
            "week" => Some(RepeatUnit::Week),
            "month" => Some(RepeatUnit::Month),
            "year" => Some(RepeatUnit::Year),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatUnit::Day => "day",
            RepeatUnit::Week => "week",
            RepeatUnit::Month => "month",
            RepeatUnit::Year => "year",
        }
    }
}

impl fmt::Display for RepeatUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The stored template from which dated occurrences are generated.
///
/// Lifecycle: OPEN (`end_date` is `None`) until paused or split, which sets
/// `end_date` and makes the definition CLOSED. A closed definition never
/// reopens; changed behavior always means a brand-new definition, so
/// already-rendered history is never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceDefinition {
    pub id: Option<String>,
    pub owner_id: String,
    pub name: String,
    pub amount: f64,
    pub currency: String,
    pub category: String,
    /// Anchor for generation; every occurrence date derives from it.
    pub start_date: DateTime<FixedOffset>,
    /// Exclusive upper bound: once set, no occurrence at or after it.
    pub end_date: Option<DateTime<FixedOffset>>,
    pub repeat_unit: RepeatUnit,
    pub repeat_interval: u32,
}

impl RecurrenceDefinition {
    /// Whether the definition still generates occurrences indefinitely.
    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }

    /// Build the virtual entry for one occurrence date. All fields other
    /// than the date are copied from the definition; the id refers back to
    /// the definition so callers can target it for edits.
    pub fn occurrence_at(&self, date: DateTime<FixedOffset>) -> FinancialEntry {
        FinancialEntry {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            name: self.name.clone(),
            amount: self.amount,
            currency: self.currency.clone(),
            category: self.category.clone(),
            date,
            is_recurring: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_repeat_unit_parse() {
        assert_eq!(RepeatUnit::parse("day"), Some(RepeatUnit::Day));
        assert_eq!(RepeatUnit::parse("week"), Some(RepeatUnit::Week));
        assert_eq!(RepeatUnit::parse("month"), Some(RepeatUnit::Month));
        assert_eq!(RepeatUnit::parse("year"), Some(RepeatUnit::Year));
        assert_eq!(RepeatUnit::parse("fortnight"), None);
        assert_eq!(RepeatUnit::parse("Month"), None);
        assert_eq!(RepeatUnit::parse(""), None);
    }

    #[test]
    fn test_serializes_with_lowercase_unit() {
        let offset = chrono::FixedOffset::east_opt(0).unwrap();
        let definition = RecurrenceDefinition {
            id: Some("def-1".to_string()),
            owner_id: "owner1".to_string(),
            name: "Streaming".to_string(),
            amount: -9.99,
            currency: "USD".to_string(),
            category: "entertainment".to_string(),
            start_date: offset.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: None,
            repeat_unit: RepeatUnit::Month,
            repeat_interval: 2,
        };

        let json = serde_json::to_value(&definition).unwrap();
        assert_eq!(json["repeat_unit"], "month");
        assert_eq!(json["repeat_interval"], 2);
        assert!(json["end_date"].is_null());

        let back: RecurrenceDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(back, definition);
    }

    #[test]
    fn test_occurrence_copies_fields() {
        let offset = chrono::FixedOffset::east_opt(0).unwrap();
        let definition = RecurrenceDefinition {
            id: Some("def-1".to_string()),
            owner_id: "owner1".to_string(),
            name: "Streaming".to_string(),
            amount: -9.99,
            currency: "USD".to_string(),
            category: "entertainment".to_string(),
            start_date: offset.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            end_date: None,
            repeat_unit: RepeatUnit::Month,
            repeat_interval: 1,
        };

        let date = offset.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let occurrence = definition.occurrence_at(date);

        assert_eq!(occurrence.id, Some("def-1".to_string()));
        assert_eq!(occurrence.owner_id, "owner1");
        assert_eq!(occurrence.name, "Streaming");
        assert_eq!(occurrence.amount, -9.99);
        assert_eq!(occurrence.currency, "USD");
        assert_eq!(occurrence.date, date);
        assert!(occurrence.is_recurring);
    }
}
