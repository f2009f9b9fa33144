//! Render targets for the record table.

use std::sync::{Mutex, PoisonError};

use crate::{entity::RecordFields, store::RecordKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    Edit,
    Delete,
}

/// A per-row control tagged with the record it acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowControl {
    pub action: RowAction,
    pub key: RecordKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub key: RecordKey,
    pub fields: RecordFields,
    pub controls: Vec<RowControl>,
}

impl TableRow {
    pub fn control(&self, action: RowAction) -> Option<&RowControl> {
        self.controls.iter().find(|control| control.action == action)
    }
}

/// The table body. `clear` followed by `append_row` per record is one render.
pub trait TableView: Send + Sync {
    fn clear(&self);

    fn append_row(&self, row: TableRow);
}

/// In-memory table, also the snapshot source for front-ends that draw it.
#[derive(Debug, Default)]
pub struct TableModel {
    rows: Mutex<Vec<TableRow>>,
}

impl TableModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<TableRow> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row_for(&self, key: &RecordKey) -> Option<TableRow> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|row| row.key == *key)
            .cloned()
    }
}

impl TableView for TableModel {
    fn clear(&self) {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn append_row(&self, row: TableRow) {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(row);
    }
}
