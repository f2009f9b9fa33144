//! Table/store synchronization for the inventory and supplier lists.
//!
//! An [`EntityListController`] binds a create form and a rendered table to a
//! [`RecordStore`]. Every mutation is followed by a full re-list and rebuild of
//! the table; there is no incremental patching.

pub mod controller;
pub mod dialog;
pub mod entity;
pub mod notice;
pub mod store;
pub mod view;

pub use controller::{ActionOutcome, CreateForm, EntityListController, IgnoreReason};
pub use dialog::{EditDialog, MissingEditDialog};
pub use entity::{Entity, EntitySchema, RecordFields};
pub use notice::{Notice, NoticeCategory, NoticeContext, NoticeLog, NoticeSink, TracingNotices};
pub use store::{
    local::{KeyedLocalStore, LocalStore},
    remote::RemoteStore,
    slots::{FileSlots, MemorySlots, SlotError, SlotStorage},
    KeyScheme, RecordKey, RecordStore, StoreError, StoredRecord,
};
pub use view::{RowAction, RowControl, TableModel, TableRow, TableView};
