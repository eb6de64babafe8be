//! # CSV Storage Module
//!
//! File-based reference implementation of the storage traits. Two CSV files
//! live under the connection's base directory: `entries.csv` for one-off
//! entries and `recurrences.csv` for recurrence definitions. Mutations
//! rewrite the whole file; ids are UUIDs assigned on insert.

pub mod connection;
pub mod entry_repository;
pub mod recurrence_repository;

pub use connection::CsvConnection;
pub use entry_repository::EntryRepository;
pub use recurrence_repository::RecurrenceRepository;
