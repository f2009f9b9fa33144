//! Backends a list controller can be bound to.

use std::fmt;

use async_trait::async_trait;
use shared::domain::RecordId;
use thiserror::Error;
use uuid::Uuid;

use crate::entity::{EntitySchema, RecordFields};

pub mod local;
pub mod remote;
pub mod slots;

use slots::SlotError;

/// How a store addresses a single record for update and delete.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// Server-assigned id; stable across renders.
    Id(RecordId),
    /// Position in the persisted array. Every record after a deleted one shifts down by one.
    Index(usize),
    /// Id generated when the record was created locally.
    Generated(Uuid),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Id(id) => write!(f, "{id}"),
            RecordKey::Index(index) => write!(f, "{index}"),
            RecordKey::Generated(key) => write!(f, "{key}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScheme {
    ServerId,
    Position,
    Generated,
}

impl KeyScheme {
    /// Parses the textual form produced by `RecordKey`'s `Display`.
    pub fn parse(self, raw: &str) -> Result<RecordKey, StoreError> {
        let raw = raw.trim();
        let invalid = || StoreError::InvalidKey {
            raw: raw.to_string(),
            scheme: self,
        };
        match self {
            KeyScheme::ServerId => raw
                .parse::<i64>()
                .map(|id| RecordKey::Id(RecordId(id)))
                .map_err(|_| invalid()),
            KeyScheme::Position => raw
                .parse::<usize>()
                .map(RecordKey::Index)
                .map_err(|_| invalid()),
            KeyScheme::Generated => raw
                .parse::<Uuid>()
                .map(RecordKey::Generated)
                .map_err(|_| invalid()),
        }
    }

    pub fn matches(self, key: &RecordKey) -> bool {
        matches!(
            (self, key),
            (KeyScheme::ServerId, RecordKey::Id(_))
                | (KeyScheme::Position, RecordKey::Index(_))
                | (KeyScheme::Generated, RecordKey::Generated(_))
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub key: RecordKey,
    pub fields: RecordFields,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("server returned a {collection} record without an id")]
    MissingId { collection: &'static str },
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error("persisted collection is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("no record with key {0}")]
    NotFound(RecordKey),
    #[error("key {key} cannot address a store keyed by {expected:?}")]
    KeyMismatch { key: RecordKey, expected: KeyScheme },
    #[error("'{raw}' is not a valid {scheme:?} key")]
    InvalidKey { raw: String, scheme: KeyScheme },
    #[error("this store does not support {0}")]
    Unsupported(&'static str),
}

/// A backing collection of records.
///
/// `list` returns records in the store's own order; the controller renders them
/// in exactly that order.
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn schema(&self) -> EntitySchema;

    fn key_scheme(&self) -> KeyScheme;

    fn supports_update(&self) -> bool {
        false
    }

    async fn list(&self) -> Result<Vec<StoredRecord>, StoreError>;

    async fn create(&self, fields: RecordFields) -> Result<(), StoreError>;

    async fn update(&self, _key: &RecordKey, _fields: RecordFields) -> Result<(), StoreError> {
        Err(StoreError::Unsupported("update"))
    }

    async fn delete(&self, key: &RecordKey) -> Result<(), StoreError>;
}

pub(crate) fn expect_scheme(scheme: KeyScheme, key: &RecordKey) -> Result<(), StoreError> {
    if scheme.matches(key) {
        Ok(())
    } else {
        Err(StoreError::KeyMismatch {
            key: key.clone(),
            expected: scheme,
        })
    }
}


#[cfg(test)]
#[path = "tests/local_tests.rs"]
mod local_tests;

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod remote_tests;
