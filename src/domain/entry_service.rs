//! Lifecycle of one-off financial entries.

use chrono_tz::Tz;
use log::info;
use std::sync::Arc;

use crate::domain::commands::entries::{CreateEntryCommand, UpdateEntryCommand};
use crate::domain::errors::DomainError;
use crate::domain::models::entry::{normalize_category, FinancialEntry};
use crate::storage::traits::{Connection, EntryStorage};

/// Service for creating, reading, editing and deleting one-off entries.
/// Every operation is scoped to the requesting owner.
#[derive(Clone)]
pub struct EntryService<C: Connection> {
    entry_repository: C::EntryRepository,
    timezone: Tz,
}

impl<C: Connection> EntryService<C> {
    pub fn new(connection: Arc<C>, timezone: Tz) -> Self {
        let entry_repository = connection.create_entry_repository();
        Self {
            entry_repository,
            timezone,
        }
    }

    /// Create a new one-off entry. The date is normalized into the owner's
    /// timezone and the category folded into the recognized set.
    pub fn create_entry(&self, command: CreateEntryCommand) -> Result<FinancialEntry, DomainError> {
        let date = command.date.resolve(self.timezone)?;

        let mut entry = FinancialEntry {
            id: None,
            owner_id: command.owner_id,
            name: command.name,
            amount: command.amount,
            currency: command.currency,
            category: normalize_category(&command.category),
            date,
            is_recurring: false,
        };

        let id = self.entry_repository.insert_entry(&entry)?;
        entry.id = Some(id);

        info!(
            "Created entry {} for owner {}",
            entry.id.as_deref().unwrap_or("?"),
            entry.owner_id
        );
        Ok(entry)
    }

    /// Fetch a single entry, distinguishing a missing id from a foreign one.
    pub fn get_entry(&self, owner_id: &str, entry_id: &str) -> Result<FinancialEntry, DomainError> {
        let entry = self
            .entry_repository
            .get_entry(entry_id)?
            .ok_or_else(|| DomainError::NotFound(format!("entry {}", entry_id)))?;

        if entry.owner_id != owner_id {
            return Err(DomainError::Authorization(format!(
                "entry {} belongs to a different owner",
                entry_id
            )));
        }
        Ok(entry)
    }

    /// Replace the user-editable fields of an owned entry.
    pub fn update_entry(&self, command: UpdateEntryCommand) -> Result<FinancialEntry, DomainError> {
        let existing = self.get_entry(&command.owner_id, &command.entry_id)?;

        let updated = FinancialEntry {
            id: existing.id.clone(),
            owner_id: existing.owner_id.clone(),
            name: command.name,
            amount: command.amount,
            currency: command.currency,
            category: normalize_category(&command.category),
            date: command.date.resolve(self.timezone)?,
            is_recurring: existing.is_recurring,
        };

        if !self.entry_repository.update_entry(&command.entry_id, &updated)? {
            return Err(DomainError::NotFound(format!("entry {}", command.entry_id)));
        }

        info!("Updated entry {} for owner {}", command.entry_id, command.owner_id);
        Ok(updated)
    }

    /// Delete an owned entry. Returns true when a record was removed.
    pub fn delete_entry(&self, owner_id: &str, entry_id: &str) -> Result<bool, DomainError> {
        self.get_entry(owner_id, entry_id)?;

        let deleted = self.entry_repository.delete_entry(entry_id)?;
        if deleted {
            info!("Deleted entry {} for owner {}", entry_id, owner_id);
        }
        Ok(deleted)
    }
}
