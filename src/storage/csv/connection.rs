//! CSV storage connection: owns the base directory and file layout.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use super::entry_repository::EntryRepository;
use super::recurrence_repository::RecurrenceRepository;
use crate::storage::traits::Connection;

/// Handle to a directory holding the CSV data files. Cheap to clone; every
/// repository created from it shares the same layout.
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Open (or create) a data directory.
    pub fn new(base_directory: impl Into<PathBuf>) -> Result<Self> {
        let base_directory = base_directory.into();
        fs::create_dir_all(&base_directory)?;
        Ok(Self { base_directory })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub(crate) fn entries_file_path(&self) -> PathBuf {
        self.base_directory.join("entries.csv")
    }

    pub(crate) fn recurrences_file_path(&self) -> PathBuf {
        self.base_directory.join("recurrences.csv")
    }

    /// Create the file with its header row if it does not exist yet.
    pub(crate) fn ensure_file_exists(&self, path: &Path, header: &[&str]) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(header)?;
        writer.flush()?;
        Ok(())
    }
}

impl Connection for CsvConnection {
    type EntryRepository = EntryRepository;
    type RecurrenceRepository = RecurrenceRepository;

    fn create_entry_repository(&self) -> EntryRepository {
        EntryRepository::new(self.clone())
    }

    fn create_recurrence_repository(&self) -> RecurrenceRepository {
        RecurrenceRepository::new(self.clone())
    }
}
