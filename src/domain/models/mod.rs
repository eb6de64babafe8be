//! Domain models shared across services and storage.

pub mod entry;
pub mod recurrence;
