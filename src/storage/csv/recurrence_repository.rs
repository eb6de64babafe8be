//! CSV-backed repository for recurrence definitions.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset};
use csv::{Reader, Writer};
use log::debug;
use uuid::Uuid;

use super::connection::CsvConnection;
use crate::domain::models::recurrence::{RecurrenceDefinition, RepeatUnit};
use crate::storage::traits::RecurrenceStorage;

const HEADER: [&str; 10] = [
    "id",
    "owner_id",
    "name",
    "amount",
    "currency",
    "category",
    "start_date",
    "end_date",
    "repeat_unit",
    "repeat_interval",
];

/// CSV-based recurrence definition repository.
#[derive(Debug, Clone)]
pub struct RecurrenceRepository {
    connection: CsvConnection,
}

impl RecurrenceRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_definitions(&self) -> Result<Vec<RecurrenceDefinition>> {
        let path = self.connection.recurrences_file_path();
        self.connection.ensure_file_exists(&path, &HEADER)?;

        let mut reader = Reader::from_path(&path)
            .with_context(|| format!("opening {}", path.display()))?;

        let mut definitions = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result?;
            definitions.push(parse_record(&record).with_context(|| {
                format!(
                    "invalid recurrence record at row {} of {}",
                    row + 2,
                    path.display()
                )
            })?);
        }
        Ok(definitions)
    }

    fn write_definitions(&self, definitions: &[RecurrenceDefinition]) -> Result<()> {
        let path = self.connection.recurrences_file_path();
        let mut writer = Writer::from_path(&path)
            .with_context(|| format!("writing {}", path.display()))?;

        writer.write_record(HEADER)?;
        for definition in definitions {
            writer.write_record(&[
                definition.id.clone().unwrap_or_default(),
                definition.owner_id.clone(),
                definition.name.clone(),
                definition.amount.to_string(),
                definition.currency.clone(),
                definition.category.clone(),
                definition.start_date.to_rfc3339(),
                definition
                    .end_date
                    .map(|end| end.to_rfc3339())
                    .unwrap_or_default(),
                definition.repeat_unit.as_str().to_string(),
                definition.repeat_interval.to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn parse_record(record: &csv::StringRecord) -> Result<RecurrenceDefinition> {
    let field = |index: usize, name: &str| -> Result<&str> {
        record
            .get(index)
            .with_context(|| format!("missing field '{}'", name))
    };

    let start_raw = field(6, "start_date")?;
    let start_date = DateTime::parse_from_rfc3339(start_raw)
        .with_context(|| format!("field 'start_date' is not RFC 3339: '{}'", start_raw))?;

    let end_raw = field(7, "end_date")?;
    let end_date = if end_raw.is_empty() {
        None
    } else {
        Some(
            DateTime::parse_from_rfc3339(end_raw)
                .with_context(|| format!("field 'end_date' is not RFC 3339: '{}'", end_raw))?,
        )
    };

    let unit_raw = field(8, "repeat_unit")?;
    let Some(repeat_unit) = RepeatUnit::parse(unit_raw) else {
        bail!("field 'repeat_unit' is not a recognized unit: '{}'", unit_raw);
    };

    Ok(RecurrenceDefinition {
        id: Some(field(0, "id")?.to_string()),
        owner_id: field(1, "owner_id")?.to_string(),
        name: field(2, "name")?.to_string(),
        amount: field(3, "amount")?
            .parse::<f64>()
            .context("field 'amount' is not a number")?,
        currency: field(4, "currency")?.to_string(),
        category: field(5, "category")?.to_string(),
        start_date,
        end_date,
        repeat_unit,
        repeat_interval: field(9, "repeat_interval")?
            .parse::<u32>()
            .context("field 'repeat_interval' is not a positive integer")?,
    })
}

impl RecurrenceStorage for RecurrenceRepository {
    fn insert_definition(&self, definition: &RecurrenceDefinition) -> Result<String> {
        let mut definitions = self.read_definitions()?;

        let id = Uuid::new_v4().to_string();
        let mut stored = definition.clone();
        stored.id = Some(id.clone());
        definitions.push(stored);

        self.write_definitions(&definitions)?;
        debug!("Inserted recurrence definition {} for owner {}", id, definition.owner_id);
        Ok(id)
    }

    fn get_definition(&self, definition_id: &str) -> Result<Option<RecurrenceDefinition>> {
        let definitions = self.read_definitions()?;
        Ok(definitions
            .into_iter()
            .find(|d| d.id.as_deref() == Some(definition_id)))
    }

    fn find_definitions(
        &self,
        owner_id: &str,
        upper_bound: DateTime<FixedOffset>,
    ) -> Result<Vec<RecurrenceDefinition>> {
        let mut matching: Vec<RecurrenceDefinition> = self
            .read_definitions()?
            .into_iter()
            .filter(|d| d.owner_id == owner_id && d.start_date <= upper_bound)
            .collect();
        matching.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        Ok(matching)
    }

    fn update_definition(
        &self,
        definition_id: &str,
        definition: &RecurrenceDefinition,
    ) -> Result<bool> {
        let mut definitions = self.read_definitions()?;

        let Some(position) = definitions
            .iter()
            .position(|d| d.id.as_deref() == Some(definition_id))
        else {
            return Ok(false);
        };

        let mut updated = definition.clone();
        updated.id = Some(definition_id.to_string());
        definitions[position] = updated;

        self.write_definitions(&definitions)?;
        Ok(true)
    }

    fn delete_definition(&self, definition_id: &str) -> Result<bool> {
        let mut definitions = self.read_definitions()?;
        let before = definitions.len();
        definitions.retain(|d| d.id.as_deref() != Some(definition_id));

        if definitions.len() == before {
            return Ok(false);
        }
        self.write_definitions(&definitions)?;
        Ok(true)
    }
}
