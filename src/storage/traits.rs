//! # Storage Traits
//!
//! Storage abstraction for the domain layer. Repositories hand out and
//! persist domain models; identifiers are opaque strings assigned on insert
//! and never interpreted by the engine. All methods are synchronous and
//! report failures through `anyhow`; the domain layer propagates them
//! unmodified and never retries.

use anyhow::Result;
use chrono::{DateTime, FixedOffset};

use crate::domain::models::entry::FinancialEntry;
use crate::domain::models::recurrence::RecurrenceDefinition;

/// Interface for one-off entry storage.
pub trait EntryStorage: Send + Sync {
    /// Persist a new entry and return its assigned id. Any id already on the
    /// entry is ignored.
    fn insert_entry(&self, entry: &FinancialEntry) -> Result<String>;

    /// Retrieve a single entry by id, across all owners.
    fn get_entry(&self, entry_id: &str) -> Result<Option<FinancialEntry>>;

    /// All of an owner's entries with `range_start <= date <= range_end`,
    /// ordered by date ascending.
    fn find_in_range(
        &self,
        owner_id: &str,
        range_start: DateTime<FixedOffset>,
        range_end: DateTime<FixedOffset>,
    ) -> Result<Vec<FinancialEntry>>;

    /// Replace an entry's fields. Returns false when the id is unknown.
    fn update_entry(&self, entry_id: &str, entry: &FinancialEntry) -> Result<bool>;

    /// Delete an entry. Returns false when the id is unknown.
    fn delete_entry(&self, entry_id: &str) -> Result<bool>;
}

/// Interface for recurrence definition storage.
pub trait RecurrenceStorage: Send + Sync {
    /// Persist a new definition and return its assigned id.
    fn insert_definition(&self, definition: &RecurrenceDefinition) -> Result<String>;

    /// Retrieve a single definition by id, across all owners.
    fn get_definition(&self, definition_id: &str) -> Result<Option<RecurrenceDefinition>>;

    /// All of an owner's definitions with `start_date <= upper_bound`,
    /// ordered by start date ascending.
    fn find_definitions(
        &self,
        owner_id: &str,
        upper_bound: DateTime<FixedOffset>,
    ) -> Result<Vec<RecurrenceDefinition>>;

    /// Replace a definition's fields. Returns false when the id is unknown.
    fn update_definition(&self, definition_id: &str, definition: &RecurrenceDefinition)
        -> Result<bool>;

    /// Delete a definition. Returns false when the id is unknown.
    fn delete_definition(&self, definition_id: &str) -> Result<bool>;
}

/// Either kind of stored record an opaque id can resolve to.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredItem {
    Entry(FinancialEntry),
    Definition(RecurrenceDefinition),
}

/// Resolve an id against the entry collection first, then the definitions.
pub fn find_item<E, R>(entries: &E, definitions: &R, id: &str) -> Result<Option<StoredItem>>
where
    E: EntryStorage,
    R: RecurrenceStorage,
{
    if let Some(entry) = entries.get_entry(id)? {
        return Ok(Some(StoredItem::Entry(entry)));
    }
    if let Some(definition) = definitions.get_definition(id)? {
        return Ok(Some(StoredItem::Definition(definition)));
    }
    Ok(None)
}

/// Factory for repositories backed by one storage connection.
///
/// Constructed once at startup and passed into every service, so the domain
/// layer works against any backend without ambient global state.
pub trait Connection: Send + Sync + Clone {
    type EntryRepository: EntryStorage + Clone;
    type RecurrenceRepository: RecurrenceStorage + Clone;

    fn create_entry_repository(&self) -> Self::EntryRepository;
    fn create_recurrence_repository(&self) -> Self::RecurrenceRepository;
}
