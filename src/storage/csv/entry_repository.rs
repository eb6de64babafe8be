//! CSV-backed repository for one-off entries.
//!
//! One `entries.csv` file per connection, whole-file rewrite on mutation.
//! Records are validated while deserializing: a row that does not match the
//! schema fails the read instead of surfacing a half-parsed entry later.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use csv::{Reader, Writer};
use log::debug;
use uuid::Uuid;

use super::connection::CsvConnection;
use crate::domain::models::entry::FinancialEntry;
use crate::storage::traits::EntryStorage;

const HEADER: [&str; 8] = [
    "id",
    "owner_id",
    "name",
    "amount",
    "currency",
    "category",
    "date",
    "is_recurring",
];

/// CSV-based entry repository.
#[derive(Debug, Clone)]
pub struct EntryRepository {
    connection: CsvConnection,
}

impl EntryRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_entries(&self) -> Result<Vec<FinancialEntry>> {
        let path = self.connection.entries_file_path();
        self.connection.ensure_file_exists(&path, &HEADER)?;

        let mut reader = Reader::from_path(&path)
            .with_context(|| format!("opening {}", path.display()))?;

        let mut entries = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result?;
            entries.push(parse_record(&record).with_context(|| {
                format!("invalid entry record at row {} of {}", row + 2, path.display())
            })?);
        }
        Ok(entries)
    }

    fn write_entries(&self, entries: &[FinancialEntry]) -> Result<()> {
        let path = self.connection.entries_file_path();
        let mut writer = Writer::from_path(&path)
            .with_context(|| format!("writing {}", path.display()))?;

        writer.write_record(HEADER)?;
        for entry in entries {
            writer.write_record(&[
                entry.id.clone().unwrap_or_default(),
                entry.owner_id.clone(),
                entry.name.clone(),
                entry.amount.to_string(),
                entry.currency.clone(),
                entry.category.clone(),
                entry.date.to_rfc3339(),
                entry.is_recurring.to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn parse_record(record: &csv::StringRecord) -> Result<FinancialEntry> {
    let field = |index: usize, name: &str| -> Result<&str> {
        record
            .get(index)
            .with_context(|| format!("missing field '{}'", name))
    };

    let date_raw = field(6, "date")?;
    let date = DateTime::parse_from_rfc3339(date_raw)
        .with_context(|| format!("field 'date' is not RFC 3339: '{}'", date_raw))?;

    Ok(FinancialEntry {
        id: Some(field(0, "id")?.to_string()),
        owner_id: field(1, "owner_id")?.to_string(),
        name: field(2, "name")?.to_string(),
        amount: field(3, "amount")?
            .parse::<f64>()
            .context("field 'amount' is not a number")?,
        currency: field(4, "currency")?.to_string(),
        category: field(5, "category")?.to_string(),
        date,
        is_recurring: field(7, "is_recurring")?
            .parse::<bool>()
            .context("field 'is_recurring' is not a boolean")?,
    })
}

impl EntryStorage for EntryRepository {
    fn insert_entry(&self, entry: &FinancialEntry) -> Result<String> {
        let mut entries = self.read_entries()?;

        let id = Uuid::new_v4().to_string();
        let mut stored = entry.clone();
        stored.id = Some(id.clone());
        entries.push(stored);

        self.write_entries(&entries)?;
        debug!("Inserted entry {} for owner {}", id, entry.owner_id);
        Ok(id)
    }

    fn get_entry(&self, entry_id: &str) -> Result<Option<FinancialEntry>> {
        let entries = self.read_entries()?;
        Ok(entries.into_iter().find(|e| e.id.as_deref() == Some(entry_id)))
    }

    fn find_in_range(
        &self,
        owner_id: &str,
        range_start: DateTime<FixedOffset>,
        range_end: DateTime<FixedOffset>,
    ) -> Result<Vec<FinancialEntry>> {
        let mut matching: Vec<FinancialEntry> = self
            .read_entries()?
            .into_iter()
            .filter(|e| e.owner_id == owner_id && e.date >= range_start && e.date <= range_end)
            .collect();
        matching.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(matching)
    }

    fn update_entry(&self, entry_id: &str, entry: &FinancialEntry) -> Result<bool> {
        let mut entries = self.read_entries()?;

        let Some(position) = entries.iter().position(|e| e.id.as_deref() == Some(entry_id))
        else {
            return Ok(false);
        };

        let mut updated = entry.clone();
        updated.id = Some(entry_id.to_string());
        entries[position] = updated;

        self.write_entries(&entries)?;
        Ok(true)
    }

    fn delete_entry(&self, entry_id: &str) -> Result<bool> {
        let mut entries = self.read_entries()?;
        let before = entries.len();
        entries.retain(|e| e.id.as_deref() != Some(entry_id));

        if entries.len() == before {
            return Ok(false);
        }
        self.write_entries(&entries)?;
        Ok(true)
    }
}
