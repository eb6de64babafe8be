//! Storage layer: abstraction traits and the CSV reference implementation.

pub mod csv;
pub mod traits;

pub use traits::{find_item, Connection, EntryStorage, RecurrenceStorage, StoredItem};
