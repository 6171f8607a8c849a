//! In-memory record store.
//!
//! ```text
//! create ──▶ IdSequence::next ──▶ insert-if-absent ──┐
//! update ──▶ get_mut(id) ──▶ replace whole record ───┼──▶ DashMap<RecordId, Record>
//! get / list ──▶ clone out under shard read lock ────┘
//! ```
//!
//! Every operation touches a single shard lock for O(1) time and never
//! awaits while holding it. Concurrent updates to the same id are
//! last-write-wins; there is no version check.

pub mod error;
pub mod record;
pub mod seed;
pub mod sequence;
pub mod store;

pub use error::{RegistryError, Result};
pub use record::{Price, PriceError, Record, RecordId};
pub use seed::{seed, DEFAULT_SEED_SIZE};
pub use sequence::IdSequence;
pub use store::Registry;
