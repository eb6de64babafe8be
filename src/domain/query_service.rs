//! Read side: merged listings of stored entries and virtual occurrences,
//! plus per-day calendar summaries.

use chrono_tz::Tz;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::commands::entries::RangeQuery;
use crate::domain::dates;
use crate::domain::errors::DomainError;
use crate::domain::models::entry::FinancialEntry;
use crate::domain::occurrence;
use crate::storage::traits::{find_item, Connection, EntryStorage, RecurrenceStorage, StoredItem};

/// Per-day totals keyed by `YYYY-MM-DD`, then by currency code. Amounts in
/// different currencies are never added together.
pub type CalendarSummary = BTreeMap<String, BTreeMap<String, f64>>;

/// Read-only service combining stored entries with recurrence expansion.
#[derive(Clone)]
pub struct QueryService<C: Connection> {
    entry_repository: C::EntryRepository,
    recurrence_repository: C::RecurrenceRepository,
    timezone: Tz,
}

impl<C: Connection> QueryService<C> {
    pub fn new(connection: Arc<C>, timezone: Tz) -> Self {
        let entry_repository = connection.create_entry_repository();
        let recurrence_repository = connection.create_recurrence_repository();
        Self {
            entry_repository,
            recurrence_repository,
            timezone,
        }
    }

    /// Everything financial an owner sees over a calendar-day window: stored
    /// entries inside the window plus virtual occurrences of every matching
    /// recurrence definition, in one date-ascending list.
    ///
    /// Occurrences are enumerated from each definition's own anchor, so a
    /// definition starting before the window contributes its early dates
    /// too. Virtual entries carry their definition's id and are not
    /// persisted by this call.
    pub fn list_entries(&self, query: RangeQuery) -> Result<Vec<FinancialEntry>, DomainError> {
        let (window_start, window_end) = self.resolve_window(&query)?;

        let mut entries = self
            .entry_repository
            .find_in_range(&query.owner_id, window_start, window_end)?;

        for definition in self
            .recurrence_repository
            .find_definitions(&query.owner_id, window_end)?
        {
            entries.extend(occurrence::occurrences(&definition, window_end));
        }

        // Stable: equal dates keep stored-before-virtual order.
        entries.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(entries)
    }

    /// Per-day, per-currency totals over the same merged view that
    /// `list_entries` returns. Totals are rounded to two decimal places
    /// once, after all amounts for the day are added.
    pub fn summarize(&self, query: RangeQuery) -> Result<CalendarSummary, DomainError> {
        let entries = self.list_entries(query)?;

        let mut summary = CalendarSummary::new();
        for entry in entries {
            let day = entry.date.format("%Y-%m-%d").to_string();
            *summary
                .entry(day)
                .or_default()
                .entry(entry.currency)
                .or_insert(0.0) += entry.amount;
        }

        for totals in summary.values_mut() {
            for total in totals.values_mut() {
                *total = (*total * 100.0).round() / 100.0;
            }
        }
        Ok(summary)
    }

    /// Resolve an opaque id to whichever record it names, entry or
    /// recurrence definition. Ids are unique across both collections, so the
    /// caller does not need to know which kind it holds.
    pub fn find_item(&self, owner_id: &str, id: &str) -> Result<StoredItem, DomainError> {
        let item = find_item(&self.entry_repository, &self.recurrence_repository, id)?
            .ok_or_else(|| DomainError::NotFound(format!("item {}", id)))?;

        let item_owner = match &item {
            StoredItem::Entry(entry) => &entry.owner_id,
            StoredItem::Definition(definition) => &definition.owner_id,
        };
        if item_owner != owner_id {
            return Err(DomainError::Authorization(format!(
                "item {} belongs to a different owner",
                id
            )));
        }
        Ok(item)
    }

    fn resolve_window(
        &self,
        query: &RangeQuery,
    ) -> Result<(chrono::DateTime<chrono::FixedOffset>, chrono::DateTime<chrono::FixedOffset>), DomainError>
    {
        let start = dates::start_of_day(query.start_date.resolve(self.timezone)?);
        let end = dates::end_of_day(query.end_date.resolve(self.timezone)?);

        if end < start {
            return Err(DomainError::Validation(format!(
                "range end {} precedes range start {}",
                end.format("%Y-%m-%d"),
                start.format("%Y-%m-%d")
            )));
        }
        Ok((start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::entries::CreateEntryCommand;
    use crate::domain::commands::recurrence::CreateRecurrenceCommand;
    use crate::domain::entry_service::EntryService;
    use crate::domain::recurrence_service::RecurrenceService;
    use crate::storage::csv::CsvConnection;
    use tempfile::tempdir;

    struct Fixture {
        entries: EntryService<CsvConnection>,
        recurrences: RecurrenceService<CsvConnection>,
        queries: QueryService<CsvConnection>,
        _dir: tempfile::TempDir,
    }

    fn setup() -> Fixture {
        let temp_dir = tempdir().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        Fixture {
            entries: EntryService::new(connection.clone(), chrono_tz::UTC),
            recurrences: RecurrenceService::new(connection.clone(), chrono_tz::UTC),
            queries: QueryService::new(connection, chrono_tz::UTC),
            _dir: temp_dir,
        }
    }

    fn one_off(owner: &str, name: &str, amount: f64, date: &str) -> CreateEntryCommand {
        CreateEntryCommand {
            owner_id: owner.to_string(),
            name: name.to_string(),
            amount,
            currency: "USD".to_string(),
            category: "food".to_string(),
            date: date.into(),
        }
    }

    fn weekly(owner: &str, name: &str, amount: f64, start: &str) -> CreateRecurrenceCommand {
        CreateRecurrenceCommand {
            owner_id: owner.to_string(),
            name: name.to_string(),
            amount,
            currency: "USD".to_string(),
            category: "entertainment".to_string(),
            start_date: start.into(),
            repeat_period: "week".to_string(),
            repeat_value: "1".to_string(),
        }
    }

    fn range(owner: &str, start: &str, end: &str) -> RangeQuery {
        RangeQuery {
            owner_id: owner.to_string(),
            start_date: start.into(),
            end_date: end.into(),
        }
    }

    #[test]
    fn test_list_merges_stored_and_virtual_in_date_order() {
        let fixture = setup();
        fixture
            .entries
            .create_entry(one_off("owner1", "Groceries", -40.0, "2024-03-06T10:00:00"))
            .unwrap();
        fixture
            .recurrences
            .create_recurrence(weekly("owner1", "Gym", -15.0, "2024-03-01T08:00:00"))
            .unwrap();

        let listed = fixture
            .queries
            .list_entries(range("owner1", "2024-03-01", "2024-03-14"))
            .unwrap();

        let names: Vec<&str> = listed.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Gym", "Groceries", "Gym"]);
        for pair in listed.windows(2) {
            assert!(pair[0].date <= pair[1].date);
        }
        assert!(listed[0].is_recurring);
        assert!(!listed[1].is_recurring);
    }

    #[test]
    fn test_virtual_occurrences_carry_definition_id() {
        let fixture = setup();
        let definition = fixture
            .recurrences
            .create_recurrence(weekly("owner1", "Gym", -15.0, "2024-03-01"))
            .unwrap();

        let listed = fixture
            .queries
            .list_entries(range("owner1", "2024-03-01", "2024-03-14"))
            .unwrap();

        assert_eq!(listed.len(), 2);
        for entry in &listed {
            assert_eq!(entry.id, definition.id);
        }
    }

    #[test]
    fn test_window_days_are_inclusive() {
        let fixture = setup();
        fixture
            .entries
            .create_entry(one_off("owner1", "Early", -1.0, "2024-03-01T00:30:00"))
            .unwrap();
        fixture
            .entries
            .create_entry(one_off("owner1", "Late", -2.0, "2024-03-07T23:45:00"))
            .unwrap();
        fixture
            .entries
            .create_entry(one_off("owner1", "Outside", -3.0, "2024-03-08T00:15:00"))
            .unwrap();

        let listed = fixture
            .queries
            .list_entries(range("owner1", "2024-03-01", "2024-03-07"))
            .unwrap();

        let names: Vec<&str> = listed.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Early", "Late"]);
    }

    #[test]
    fn test_definition_anchored_before_window_contributes_from_its_start() {
        let fixture = setup();
        fixture
            .recurrences
            .create_recurrence(weekly("owner1", "Gym", -15.0, "2024-01-05"))
            .unwrap();

        let listed = fixture
            .queries
            .list_entries(range("owner1", "2024-02-01", "2024-02-02"))
            .unwrap();

        // Enumeration starts at the anchor, not the window start.
        assert_eq!(
            listed.first().map(|e| e.date.date_naive()),
            Some(chrono::NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        );
        assert_eq!(listed.len(), 5);
    }

    #[test]
    fn test_list_is_scoped_to_owner() {
        let fixture = setup();
        fixture
            .entries
            .create_entry(one_off("owner1", "Mine", -5.0, "2024-03-05"))
            .unwrap();
        fixture
            .entries
            .create_entry(one_off("owner2", "Theirs", -7.0, "2024-03-05"))
            .unwrap();
        fixture
            .recurrences
            .create_recurrence(weekly("owner2", "Their gym", -15.0, "2024-03-01"))
            .unwrap();

        let listed = fixture
            .queries
            .list_entries(range("owner1", "2024-03-01", "2024-03-31"))
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Mine");
    }

    #[test]
    fn test_list_rejects_inverted_range() {
        let fixture = setup();
        let result = fixture
            .queries
            .list_entries(range("owner1", "2024-03-10", "2024-03-01"));
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_summarize_groups_by_day() {
        let fixture = setup();
        fixture
            .entries
            .create_entry(one_off("owner1", "Groceries", -40.5, "2024-03-05T10:00:00"))
            .unwrap();
        fixture
            .recurrences
            .create_recurrence(weekly("owner1", "Gym", -15.0, "2024-03-01T08:00:00"))
            .unwrap();

        let summary = fixture
            .queries
            .summarize(range("owner1", "2024-03-01", "2024-03-07"))
            .unwrap();

        assert_eq!(summary.len(), 2);
        assert_eq!(summary["2024-03-01"]["USD"], -15.0);
        assert_eq!(summary["2024-03-05"]["USD"], -40.5);
    }

    #[test]
    fn test_summarize_sums_same_day_and_rounds_once() {
        let fixture = setup();
        // 0.1 + 0.2 is not representable exactly; the day total must still
        // come out as 0.3.
        fixture
            .entries
            .create_entry(one_off("owner1", "A", 0.1, "2024-03-05T09:00:00"))
            .unwrap();
        fixture
            .entries
            .create_entry(one_off("owner1", "B", 0.2, "2024-03-05T15:00:00"))
            .unwrap();

        let summary = fixture
            .queries
            .summarize(range("owner1", "2024-03-05", "2024-03-05"))
            .unwrap();

        assert_eq!(summary["2024-03-05"]["USD"], 0.3);
    }

    #[test]
    fn test_summarize_rounds_midpoint_up() {
        let fixture = setup();
        fixture
            .entries
            .create_entry(one_off("owner1", "Refund", 12.345, "2024-03-05T10:00:00"))
            .unwrap();
        let mut gym = weekly("owner1", "Gym", -15.0, "2024-03-05T08:00:00");
        gym.currency = "EUR".to_string();
        fixture.recurrences.create_recurrence(gym).unwrap();

        let summary = fixture
            .queries
            .summarize(range("owner1", "2024-03-05", "2024-03-05"))
            .unwrap();

        let day = &summary["2024-03-05"];
        assert_eq!(day["USD"], 12.35);
        assert_eq!(day["EUR"], -15.0);
    }

    #[test]
    fn test_summarize_keeps_currencies_apart() {
        let fixture = setup();
        let mut euros = one_off("owner1", "Rent", -800.0, "2024-03-05");
        euros.currency = "EUR".to_string();
        fixture.entries.create_entry(euros).unwrap();
        fixture
            .entries
            .create_entry(one_off("owner1", "Lunch", -12.0, "2024-03-05T12:00:00"))
            .unwrap();

        let summary = fixture
            .queries
            .summarize(range("owner1", "2024-03-05", "2024-03-05"))
            .unwrap();

        let day = &summary["2024-03-05"];
        assert_eq!(day["EUR"], -800.0);
        assert_eq!(day["USD"], -12.0);
    }

    #[test]
    fn test_find_item_resolves_either_collection() {
        let fixture = setup();
        let entry = fixture
            .entries
            .create_entry(one_off("owner1", "Lunch", -12.0, "2024-03-05"))
            .unwrap();
        let definition = fixture
            .recurrences
            .create_recurrence(weekly("owner1", "Gym", -15.0, "2024-03-01"))
            .unwrap();

        match fixture
            .queries
            .find_item("owner1", entry.id.as_deref().unwrap())
            .unwrap()
        {
            StoredItem::Entry(found) => assert_eq!(found.name, "Lunch"),
            other => panic!("expected an entry, got {:?}", other),
        }
        match fixture
            .queries
            .find_item("owner1", definition.id.as_deref().unwrap())
            .unwrap()
        {
            StoredItem::Definition(found) => assert_eq!(found.name, "Gym"),
            other => panic!("expected a definition, got {:?}", other),
        }

        let missing = fixture.queries.find_item("owner1", "missing");
        assert!(matches!(missing, Err(DomainError::NotFound(_))));
        let foreign = fixture
            .queries
            .find_item("owner2", definition.id.as_deref().unwrap());
        assert!(matches!(foreign, Err(DomainError::Authorization(_))));
    }

    #[test]
    fn test_summarize_empty_window() {
        let fixture = setup();
        let summary = fixture
            .queries
            .summarize(range("owner1", "2024-03-01", "2024-03-07"))
            .unwrap();
        assert!(summary.is_empty());
    }
}
