//! Error taxonomy surfaced by the domain layer.
//!
//! Storage repositories report failures through `anyhow`; the domain wraps
//! them unmodified in [`DomainError::Storage`] and never retries. The other
//! variants map directly to caller-visible outcomes: validation problems are
//! final, missing ids stay distinct from ownership mismatches so a transport
//! layer can map them to different codes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed input: unrecognized repeat unit, non-positive interval,
    /// unparseable date string, or an invariant-breaking date combination.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation targets an id absent from storage.
    #[error("not found: {0}")]
    NotFound(String),

    /// The target exists but belongs to a different owner.
    #[error("not authorized: {0}")]
    Authorization(String),

    /// The storage collaborator failed; propagated unmodified.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
