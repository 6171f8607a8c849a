use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::error::{RegistryError, Result};
use super::record::{Price, Record, RecordId};
use super::sequence::IdSequence;

/// Thread-safe record store. Share it behind an `Arc`.
///
/// Readers get clones taken under the shard lock, so a record is never
/// observed half-written.
#[derive(Debug, Default)]
pub struct Registry {
    records: DashMap<RecordId, Record>,
    sequence: IdSequence,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record, ordered by id.
    ///
    /// Each record is consistent on its own; records of different ids may
    /// come from different moments.
    pub fn list(&self) -> Vec<Record> {
        let mut records: Vec<Record> = self.records.iter().map(|e| e.value().clone()).collect();
        records.sort_unstable_by_key(|r| r.id);
        records
    }

    pub fn get(&self, id: RecordId) -> Result<Record> {
        self.records
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or(RegistryError::NotFound(id))
    }

    /// Store a new record under a freshly allocated id.
    pub fn create(&self, name: impl Into<String>, price: Price) -> Result<Record> {
        let record = Record {
            id: self.sequence.next(),
            name: name.into(),
            price,
            last_update: now_millis(),
        };
        self.insert_vacant(record)
    }

    /// Store a record under the id it already carries.
    ///
    /// The sequence is advanced past that id so later [`create`] calls
    /// cannot collide with it.
    ///
    /// [`create`]: Registry::create
    pub fn insert(&self, record: Record) -> Result<Record> {
        self.sequence.advance_past(record.id);
        self.insert_vacant(record)
    }

    /// Replace the record stored under `id` as a single unit.
    ///
    /// `last_update` is always strictly greater than the replaced value,
    /// even when two writes land within the same millisecond.
    pub fn update(&self, id: RecordId, name: impl Into<String>, price: Price) -> Result<Record> {
        let mut entry = self.records.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        let last_update = now_millis().max(entry.last_update + 1);
        *entry = Record {
            id,
            name: name.into(),
            price,
            last_update,
        };
        Ok(entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert_vacant(&self, record: Record) -> Result<Record> {
        match self.records.entry(record.id) {
            Entry::Occupied(_) => Err(RegistryError::Conflict(record.id)),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
