//! Recurring event expansion and lifecycle engine for personal finance data.
//!
//! One-off entries are stored as-is; recurring charges are stored once as a
//! [`domain::models::recurrence::RecurrenceDefinition`] and expanded into
//! dated occurrences at read time. Definitions are closed (never edited in
//! place) when a subscription is paused or its terms change, so history
//! already shown to the user stays stable.
//!
//! [`Engine`] bundles the three domain services over one storage connection;
//! the CSV backend in [`storage::csv`] is the reference implementation of
//! the storage traits.

pub mod domain;
pub mod storage;

use chrono_tz::Tz;
use std::path::Path;
use std::sync::Arc;

use domain::{EntryService, QueryService, RecurrenceService};
use storage::csv::CsvConnection;
use storage::Connection;

/// All domain services wired to one storage connection and one owner
/// timezone. Cheap to clone; clones share the connection.
#[derive(Clone)]
pub struct Engine<C: Connection> {
    pub entries: EntryService<C>,
    pub recurrences: RecurrenceService<C>,
    pub queries: QueryService<C>,
}

impl<C: Connection> Engine<C> {
    pub fn new(connection: Arc<C>, timezone: Tz) -> Self {
        Self {
            entries: EntryService::new(connection.clone(), timezone),
            recurrences: RecurrenceService::new(connection.clone(), timezone),
            queries: QueryService::new(connection, timezone),
        }
    }
}

impl Engine<CsvConnection> {
    /// Open (or create) a CSV-backed engine under `base_directory`.
    pub fn open_csv(base_directory: impl AsRef<Path>, timezone: Tz) -> anyhow::Result<Self> {
        let connection = CsvConnection::new(base_directory.as_ref())?;
        Ok(Self::new(Arc::new(connection), timezone))
    }
}
