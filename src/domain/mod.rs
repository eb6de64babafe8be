//! # Domain Module
//!
//! Business logic of the engine: models, date normalization, occurrence
//! generation, and the services orchestrating them over the storage traits.

pub mod commands;
pub mod dates;
pub mod entry_service;
pub mod errors;
pub mod models;
pub mod occurrence;
pub mod period;
pub mod query_service;
pub mod recurrence_service;

pub use entry_service::EntryService;
pub use errors::DomainError;
pub use query_service::{CalendarSummary, QueryService};
pub use recurrence_service::RecurrenceService;
