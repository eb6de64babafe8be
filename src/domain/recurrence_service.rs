//! Lifecycle of recurrence definitions: create, split, pause, delete, and
//! materialization of occurrences into stored entries.
//!
//! A definition is never edited in place. Changing its behavior means
//! closing it (setting `end_date`) and opening a replacement, so entries
//! already shown to the user keep their dates and amounts.

use chrono::{Duration, Utc};
use chrono_tz::Tz;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::recurrence::{
    CreateRecurrenceCommand, DeleteRecurrenceCommand, PauseRecurrenceCommand,
    SplitRecurrenceCommand,
};
use crate::domain::dates;
use crate::domain::errors::DomainError;
use crate::domain::models::entry::{normalize_category, FinancialEntry};
use crate::domain::models::recurrence::{RecurrenceDefinition, RepeatUnit};
use crate::domain::occurrence;
use crate::storage::traits::{Connection, EntryStorage, RecurrenceStorage};

/// Service managing the full lifecycle of recurrence definitions.
#[derive(Clone)]
pub struct RecurrenceService<C: Connection> {
    recurrence_repository: C::RecurrenceRepository,
    entry_repository: C::EntryRepository,
    timezone: Tz,
}

impl<C: Connection> RecurrenceService<C> {
    pub fn new(connection: Arc<C>, timezone: Tz) -> Self {
        let recurrence_repository = connection.create_recurrence_repository();
        let entry_repository = connection.create_entry_repository();
        Self {
            recurrence_repository,
            entry_repository,
            timezone,
        }
    }

    /// Create a new open definition. The repeat period and interval are
    /// validated here; nothing is persisted when either is rejected.
    pub fn create_recurrence(
        &self,
        command: CreateRecurrenceCommand,
    ) -> Result<RecurrenceDefinition, DomainError> {
        let Some(repeat_unit) = RepeatUnit::parse(&command.repeat_period) else {
            return Err(DomainError::Validation(format!(
                "'{}' is not a repeat period (expected day, week, month or year)",
                command.repeat_period
            )));
        };
        let repeat_interval = parse_interval(&command.repeat_value)?;
        let start_date = command.start_date.resolve(self.timezone)?;

        let mut definition = RecurrenceDefinition {
            id: None,
            owner_id: command.owner_id,
            name: command.name,
            amount: command.amount,
            currency: command.currency,
            category: normalize_category(&command.category),
            start_date,
            end_date: None,
            repeat_unit,
            repeat_interval,
        };

        let id = self.recurrence_repository.insert_definition(&definition)?;
        definition.id = Some(id);

        info!(
            "Created recurrence {} for owner {} (every {} {})",
            definition.id.as_deref().unwrap_or("?"),
            definition.owner_id,
            definition.repeat_interval,
            definition.repeat_unit,
        );
        Ok(definition)
    }

    /// Persist every occurrence of `definition` up to its end date, or up to
    /// now for an open definition. Each stored copy gets its own id; the
    /// definition itself is left untouched.
    pub fn materialize_occurrences(
        &self,
        definition: &RecurrenceDefinition,
    ) -> Result<Vec<FinancialEntry>, DomainError> {
        let upper_bound = definition
            .end_date
            .unwrap_or_else(|| dates::localize(Utc::now().fixed_offset(), self.timezone));

        let mut stored = Vec::new();
        for occurrence in occurrence::occurrences(definition, upper_bound) {
            let mut entry = occurrence;
            entry.id = None;
            let id = self.entry_repository.insert_entry(&entry)?;
            entry.id = Some(id);
            stored.push(entry);
        }

        info!(
            "Materialized {} occurrences of recurrence {}",
            stored.len(),
            definition.id.as_deref().unwrap_or("?"),
        );
        Ok(stored)
    }

    /// Close a definition the day before `effective_date` and open a
    /// replacement carrying `attributes` from `effective_date` on.
    ///
    /// The close is committed before the replacement is validated. When the
    /// new attributes are rejected the original stays truncated; the caller
    /// sees the error and can retry the replacement without the old
    /// definition generating occurrences past the cutoff in the meantime.
    pub fn split_and_replace(
        &self,
        command: SplitRecurrenceCommand,
    ) -> Result<(RecurrenceDefinition, RecurrenceDefinition), DomainError> {
        let existing = self.fetch_owned(&command.owner_id, &command.recurrence_id)?;
        let effective_date = command.effective_date.resolve(self.timezone)?;

        let cutoff = dates::end_of_day(effective_date - Duration::days(1));
        if cutoff < existing.start_date {
            return Err(DomainError::Validation(format!(
                "effective date {} precedes the start of recurrence {}",
                effective_date.format("%Y-%m-%d"),
                command.recurrence_id
            )));
        }

        let mut closed = existing;
        closed.end_date = Some(cutoff);
        if !self
            .recurrence_repository
            .update_definition(&command.recurrence_id, &closed)?
        {
            return Err(DomainError::NotFound(format!(
                "recurrence {}",
                command.recurrence_id
            )));
        }
        info!(
            "Closed recurrence {} at {} for split",
            command.recurrence_id,
            cutoff.format("%Y-%m-%d"),
        );

        let replacement = self
            .create_recurrence(CreateRecurrenceCommand {
                owner_id: command.owner_id,
                name: command.attributes.name,
                amount: command.attributes.amount,
                currency: command.attributes.currency,
                category: command.attributes.category,
                start_date: effective_date.into(),
                repeat_period: command.attributes.repeat_period,
                repeat_value: command.attributes.repeat_value,
            })
            .map_err(|err| {
                warn!(
                    "Replacement for recurrence {} rejected after close: {}",
                    command.recurrence_id, err
                );
                err
            })?;

        Ok((closed, replacement))
    }

    /// Stop a definition at `pause_date`: no occurrence on or after that
    /// day is generated again. Pausing an already-closed definition just
    /// moves its end date. The pause date may not precede the anchor, so a
    /// stored definition never ends before it starts.
    pub fn pause(
        &self,
        command: PauseRecurrenceCommand,
    ) -> Result<RecurrenceDefinition, DomainError> {
        let existing = self.fetch_owned(&command.owner_id, &command.recurrence_id)?;
        let pause_date = command.pause_date.resolve(self.timezone)?;

        if pause_date < existing.start_date {
            return Err(DomainError::Validation(format!(
                "pause date {} precedes the start of recurrence {}",
                pause_date.format("%Y-%m-%d"),
                command.recurrence_id
            )));
        }

        let mut closed = existing;
        closed.end_date = Some(pause_date);
        if !self
            .recurrence_repository
            .update_definition(&command.recurrence_id, &closed)?
        {
            return Err(DomainError::NotFound(format!(
                "recurrence {}",
                command.recurrence_id
            )));
        }

        info!(
            "Paused recurrence {} at {}",
            command.recurrence_id,
            pause_date.format("%Y-%m-%d"),
        );
        Ok(closed)
    }

    /// Remove a definition entirely. Entries materialized from it earlier
    /// are regular stored entries and are not touched.
    pub fn delete_recurrence(
        &self,
        command: DeleteRecurrenceCommand,
    ) -> Result<bool, DomainError> {
        self.fetch_owned(&command.owner_id, &command.recurrence_id)?;

        let deleted = self
            .recurrence_repository
            .delete_definition(&command.recurrence_id)?;
        if deleted {
            info!(
                "Deleted recurrence {} for owner {}",
                command.recurrence_id, command.owner_id
            );
        }
        Ok(deleted)
    }

    fn fetch_owned(
        &self,
        owner_id: &str,
        recurrence_id: &str,
    ) -> Result<RecurrenceDefinition, DomainError> {
        let definition = self
            .recurrence_repository
            .get_definition(recurrence_id)?
            .ok_or_else(|| DomainError::NotFound(format!("recurrence {}", recurrence_id)))?;

        if definition.owner_id != owner_id {
            return Err(DomainError::Authorization(format!(
                "recurrence {} belongs to a different owner",
                recurrence_id
            )));
        }
        Ok(definition)
    }
}

/// Interval strings must be unsigned decimal digits with a positive value.
/// Signs, whitespace and fractions are all rejected.
fn parse_interval(raw: &str) -> Result<u32, DomainError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::Validation(format!(
            "'{}' is not a positive integer interval",
            raw
        )));
    }
    let interval = raw
        .parse::<u32>()
        .map_err(|_| DomainError::Validation(format!("interval '{}' is out of range", raw)))?;
    if interval == 0 {
        return Err(DomainError::Validation(
            "interval must be at least 1".to_string(),
        ));
    }
    Ok(interval)
}
