use async_trait::async_trait;

use crate::entity::{EntitySchema, RecordFields};

/// Asks the user for replacement values of one record.
///
/// `current` pre-fills the dialog. `None` means the user dismissed it.
#[async_trait]
pub trait EditDialog: Send + Sync {
    async fn edit(&self, schema: EntitySchema, current: &RecordFields) -> Option<RecordFields>;
}

/// Used when no dialog is wired in; every edit is treated as cancelled.
pub struct MissingEditDialog;

#[async_trait]
impl EditDialog for MissingEditDialog {
    async fn edit(&self, _schema: EntitySchema, _current: &RecordFields) -> Option<RecordFields> {
        None
    }
}
