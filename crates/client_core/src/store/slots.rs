//! Named string slots, the persistence primitive under the local stores.

use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("failed to read slot '{slot}': {source}")]
    Read { slot: String, source: io::Error },
    #[error("failed to write slot '{slot}': {source}")]
    Write { slot: String, source: io::Error },
}

/// Whole-value reads and writes; there is no partial update and no locking
/// across processes, so the last writer wins.
pub trait SlotStorage: Send + Sync {
    fn read(&self, slot: &str) -> Result<Option<String>, SlotError>;

    fn write(&self, slot: &str, value: &str) -> Result<(), SlotError>;
}

/// One `<slot>.json` file per slot inside `dir`.
#[derive(Debug, Clone)]
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}

impl SlotStorage for FileSlots {
    fn read(&self, slot: &str) -> Result<Option<String>, SlotError> {
        match fs::read_to_string(self.path_for(slot)) {
            Ok(value) => Ok(Some(value)),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SlotError::Read {
                slot: slot.to_string(),
                source,
            }),
        }
    }

    fn write(&self, slot: &str, value: &str) -> Result<(), SlotError> {
        let write_err = |source| SlotError::Write {
            slot: slot.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(write_err)?;

        // readers never observe a half-written file
        let target = self.path_for(slot);
        let staging = self.dir.join(format!("{slot}.json.tmp"));
        fs::write(&staging, value).map_err(write_err)?;
        fs::rename(&staging, &target).map_err(write_err)?;
        Ok(())
    }
}

/// Process-local slots, lost on exit.
#[derive(Debug, Default)]
pub struct MemorySlots {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: &str) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(slot)
            .cloned()
    }
}

impl SlotStorage for MemorySlots {
    fn read(&self, slot: &str) -> Result<Option<String>, SlotError> {
        Ok(self.get(slot))
    }

    fn write(&self, slot: &str, value: &str) -> Result<(), SlotError> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slot.to_string(), value.to_string());
        Ok(())
    }
}
