//! Stores persisted as one JSON array per slot.

use std::{marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    expect_scheme, slots::SlotStorage, KeyScheme, RecordKey, RecordStore, StoreError,
    StoredRecord,
};
use crate::entity::{Entity, EntitySchema, RecordFields};

/// Positional store: a record's key is its index in the persisted array.
///
/// Deleting index `i` shifts every later record down by one, so keys handed out
/// by an earlier `list` are only valid until the next mutation. Update is not
/// offered.
pub struct LocalStore<E> {
    slots: Arc<dyn SlotStorage>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> LocalStore<E> {
    pub fn new(slots: Arc<dyn SlotStorage>) -> Self {
        Self {
            slots,
            _entity: PhantomData,
        }
    }

    pub fn slot(&self) -> &'static str {
        E::SCHEMA.storage_slot
    }

    fn load(&self) -> Result<Vec<E>, StoreError> {
        let seeded = || {
            E::SCHEMA
                .default_fields()
                .into_iter()
                .map(|fields| E::from_fields(None, fields))
                .collect()
        };
        load_or_seed(self.slots.as_ref(), self.slot(), seeded)
    }

    fn save(&self, records: &[E]) -> Result<(), StoreError> {
        save(self.slots.as_ref(), self.slot(), records)
    }
}

#[async_trait]
impl<E: Entity> RecordStore for LocalStore<E> {
    fn schema(&self) -> EntitySchema {
        E::SCHEMA
    }

    fn key_scheme(&self) -> KeyScheme {
        KeyScheme::Position
    }

    async fn list(&self) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self
            .load()?
            .iter()
            .enumerate()
            .map(|(index, record)| StoredRecord {
                key: RecordKey::Index(index),
                fields: record.fields(),
            })
            .collect())
    }

    async fn create(&self, fields: RecordFields) -> Result<(), StoreError> {
        let mut records = self.load()?;
        records.push(E::from_fields(None, fields));
        self.save(&records)
    }

    /// An index past the end leaves the collection untouched.
    async fn delete(&self, key: &RecordKey) -> Result<(), StoreError> {
        expect_scheme(KeyScheme::Position, key)?;
        let RecordKey::Index(index) = *key else {
            return Ok(());
        };

        let mut records = self.load()?;
        if index < records.len() {
            records.remove(index);
        } else {
            debug!(slot = self.slot(), index, "delete index out of range");
        }
        self.save(&records)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "E: Entity")]
struct KeyedEntry<E> {
    key: Uuid,
    #[serde(flatten)]
    record: E,
}

/// Local store whose records carry a generated UUID, so keys survive deletions.
///
/// Uses its own slot (`<slot>Keyed`), leaving the positional store's data alone.
pub struct KeyedLocalStore<E> {
    slots: Arc<dyn SlotStorage>,
    slot: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> KeyedLocalStore<E> {
    pub fn new(slots: Arc<dyn SlotStorage>) -> Self {
        Self {
            slots,
            slot: format!("{}Keyed", E::SCHEMA.storage_slot),
            _entity: PhantomData,
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    fn load(&self) -> Result<Vec<KeyedEntry<E>>, StoreError> {
        let seeded = || {
            E::SCHEMA
                .default_fields()
                .into_iter()
                .map(|fields| KeyedEntry {
                    key: Uuid::new_v4(),
                    record: E::from_fields(None, fields),
                })
                .collect()
        };
        load_or_seed(self.slots.as_ref(), &self.slot, seeded)
    }

    fn save(&self, entries: &[KeyedEntry<E>]) -> Result<(), StoreError> {
        save(self.slots.as_ref(), &self.slot, entries)
    }
}

#[async_trait]
impl<E: Entity> RecordStore for KeyedLocalStore<E> {
    fn schema(&self) -> EntitySchema {
        E::SCHEMA
    }

    fn key_scheme(&self) -> KeyScheme {
        KeyScheme::Generated
    }

    fn supports_update(&self) -> bool {
        true
    }

    async fn list(&self) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self
            .load()?
            .iter()
            .map(|entry| StoredRecord {
                key: RecordKey::Generated(entry.key),
                fields: entry.record.fields(),
            })
            .collect())
    }

    async fn create(&self, fields: RecordFields) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.push(KeyedEntry {
            key: Uuid::new_v4(),
            record: E::from_fields(None, fields),
        });
        self.save(&entries)
    }

    async fn update(&self, key: &RecordKey, fields: RecordFields) -> Result<(), StoreError> {
        expect_scheme(KeyScheme::Generated, key)?;
        let mut entries = self.load()?;
        let entry = entries
            .iter_mut()
            .find(|entry| RecordKey::Generated(entry.key) == *key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        entry.record = E::from_fields(None, fields);
        self.save(&entries)
    }

    async fn delete(&self, key: &RecordKey) -> Result<(), StoreError> {
        expect_scheme(KeyScheme::Generated, key)?;
        let mut entries = self.load()?;
        entries.retain(|entry| RecordKey::Generated(entry.key) != *key);
        self.save(&entries)
    }
}

/// Reads `slot`, seeding it with `seed()` when it is absent, blank or `null`.
fn load_or_seed<T>(
    slots: &dyn SlotStorage,
    slot: &str,
    seed: impl FnOnce() -> Vec<T>,
) -> Result<Vec<T>, StoreError>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let stored = match slots.read(slot)? {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str::<Option<Vec<T>>>(&raw)?,
        _ => None,
    };
    match stored {
        Some(records) => Ok(records),
        None => {
            let defaults = seed();
            save(slots, slot, &defaults)?;
            info!(slot, count = defaults.len(), "seeded empty slot with defaults");
            Ok(defaults)
        }
    }
}

fn save<T: Serialize>(slots: &dyn SlotStorage, slot: &str, records: &[T]) -> Result<(), StoreError> {
    let raw = serde_json::to_string(records)?;
    slots.write(slot, &raw)?;
    Ok(())
}
