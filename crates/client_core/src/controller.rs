use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    dialog::{EditDialog, MissingEditDialog},
    entity::{EntitySchema, RecordFields},
    notice::{Notice, NoticeContext, NoticeSink, TracingNotices},
    store::{RecordKey, RecordStore, StoreError},
    view::{RowAction, RowControl, TableRow, TableView},
};

/// The create form's two text inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateForm {
    pub name: String,
    pub detail: String,
}

impl CreateForm {
    pub fn new(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: detail.into(),
        }
    }

    /// Trimmed values, or `None` when either input is blank.
    pub fn submission(&self) -> Option<RecordFields> {
        let fields = RecordFields::new(self.name.trim(), self.detail.trim());
        fields.is_complete().then_some(fields)
    }

    pub fn reset(&mut self) {
        self.name.clear();
        self.detail.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The store call (if any) succeeded and the table was rebuilt.
    Rendered,
    /// Nothing was sent to the store.
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    MissingField,
    Cancelled,
    EditUnsupported,
    AlreadyInitialized,
}

/// Keeps a [`TableView`] in step with a [`RecordStore`].
///
/// Each action is one store call followed by a full re-list; actions issued
/// through the same controller run one at a time. Store failures are published
/// to the [`NoticeSink`] and returned, and leave the table as last rendered.
pub struct EntityListController {
    store: Arc<dyn RecordStore>,
    view: Arc<dyn TableView>,
    dialog: Arc<dyn EditDialog>,
    notices: Arc<dyn NoticeSink>,
    initialized: AtomicBool,
    action_lock: Mutex<()>,
}

impl EntityListController {
    pub fn new(store: Arc<dyn RecordStore>, view: Arc<dyn TableView>) -> Self {
        Self {
            store,
            view,
            dialog: Arc::new(MissingEditDialog),
            notices: Arc::new(TracingNotices),
            initialized: AtomicBool::new(false),
            action_lock: Mutex::new(()),
        }
    }

    pub fn with_dialog(mut self, dialog: Arc<dyn EditDialog>) -> Self {
        self.dialog = dialog;
        self
    }

    pub fn with_notices(mut self, notices: Arc<dyn NoticeSink>) -> Self {
        self.notices = notices;
        self
    }

    pub fn schema(&self) -> EntitySchema {
        self.store.schema()
    }

    pub fn is_editable(&self) -> bool {
        self.store.supports_update()
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// First render. Later calls do nothing; use [`Self::render`] to reload.
    pub async fn initialize(&self) -> Result<ActionOutcome, StoreError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("controller already initialized");
            return Ok(ActionOutcome::Ignored(IgnoreReason::AlreadyInitialized));
        }
        info!(collection = %self.schema().collection, "initializing list");
        self.render().await
    }

    pub async fn render(&self) -> Result<ActionOutcome, StoreError> {
        let _guard = self.action_lock.lock().await;
        self.render_locked().await
    }

    /// Trims both inputs; a blank input drops the submission without a store call.
    /// The form is reset only after the record was stored.
    pub async fn on_create_submit(
        &self,
        form: &mut CreateForm,
    ) -> Result<ActionOutcome, StoreError> {
        let Some(fields) = form.submission() else {
            debug!("create submission missing a field");
            return Ok(ActionOutcome::Ignored(IgnoreReason::MissingField));
        };

        let _guard = self.action_lock.lock().await;
        self.report(NoticeContext::Create, self.store.create(fields).await)?;
        form.reset();
        self.render_locked().await
    }

    pub async fn on_delete_click(&self, key: &RecordKey) -> Result<ActionOutcome, StoreError> {
        let _guard = self.action_lock.lock().await;
        self.report(NoticeContext::Delete, self.store.delete(key).await)?;
        self.render_locked().await
    }

    /// Opens the edit dialog pre-filled with `current`. Dismissing it, or leaving
    /// a field empty, aborts without a store call.
    pub async fn on_edit_click(
        &self,
        key: &RecordKey,
        current: &RecordFields,
    ) -> Result<ActionOutcome, StoreError> {
        if !self.store.supports_update() {
            return Ok(ActionOutcome::Ignored(IgnoreReason::EditUnsupported));
        }

        let edited = self.dialog.edit(self.schema(), current).await;
        let Some(fields) = edited.filter(RecordFields::is_complete) else {
            debug!(%key, "edit cancelled");
            return Ok(ActionOutcome::Ignored(IgnoreReason::Cancelled));
        };

        let _guard = self.action_lock.lock().await;
        self.report(NoticeContext::Update, self.store.update(key, fields).await)?;
        self.render_locked().await
    }

    /// Delegated click handling for a rendered row's control.
    pub async fn on_row_action(
        &self,
        row: &TableRow,
        action: RowAction,
    ) -> Result<ActionOutcome, StoreError> {
        let Some(control) = row.control(action) else {
            return Ok(ActionOutcome::Ignored(IgnoreReason::EditUnsupported));
        };
        match control.action {
            RowAction::Delete => self.on_delete_click(&control.key).await,
            RowAction::Edit => self.on_edit_click(&control.key, &row.fields).await,
        }
    }

    /// Lists first and only then clears the view, so a failed list keeps the
    /// previous rows on screen.
    async fn render_locked(&self) -> Result<ActionOutcome, StoreError> {
        let records = self.report(NoticeContext::Load, self.store.list().await)?;
        let editable = self.store.supports_update();

        self.view.clear();
        for record in records {
            let mut controls = Vec::with_capacity(2);
            if editable {
                controls.push(RowControl {
                    action: RowAction::Edit,
                    key: record.key.clone(),
                });
            }
            controls.push(RowControl {
                action: RowAction::Delete,
                key: record.key.clone(),
            });
            self.view.append_row(TableRow {
                key: record.key,
                fields: record.fields,
                controls,
            });
        }
        Ok(ActionOutcome::Rendered)
    }

    fn report<T>(
        &self,
        context: NoticeContext,
        result: Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        result.map_err(|error| {
            self.notices
                .publish(Notice::from_store_error(context, &error));
            error
        })
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
