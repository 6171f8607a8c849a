use thiserror::Error;

use super::RecordId;

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Failures surfaced by [`Registry`](super::Registry) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("record not found by {0}")]
    NotFound(RecordId),
    /// Only reachable through caller-supplied ids; sequence allocation
    /// never hands out a taken id.
    #[error("record already exists for {0}")]
    Conflict(RecordId),
}
