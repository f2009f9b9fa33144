//! Non-blocking notices for failed store calls.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeCategory {
    /// The server could not be reached or the response could not be read.
    Transport,
    /// The server answered with an error status.
    Rejected,
    /// The local slot could not be read, written or decoded.
    Storage,
    /// The request was malformed before it left the client.
    Usage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeContext {
    Load,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone)]
pub struct Notice {
    category: NoticeCategory,
    context: NoticeContext,
    message: String,
    raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn from_store_error(context: NoticeContext, error: &StoreError) -> Self {
        let category = match error {
            StoreError::Transport(_) | StoreError::MissingId { .. } => NoticeCategory::Transport,
            StoreError::Status { .. } | StoreError::NotFound(_) => NoticeCategory::Rejected,
            StoreError::Slot(_) | StoreError::Corrupt(_) => NoticeCategory::Storage,
            StoreError::InvalidUrl { .. }
            | StoreError::KeyMismatch { .. }
            | StoreError::InvalidKey { .. }
            | StoreError::Unsupported(_) => NoticeCategory::Usage,
        };

        Self {
            category,
            context,
            message: error.to_string(),
            raised_at: Utc::now(),
        }
    }

    pub fn category(&self) -> NoticeCategory {
        self.category
    }

    pub fn context(&self) -> NoticeContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn raised_at(&self) -> DateTime<Utc> {
        self.raised_at
    }

    /// One-line text suitable for a status bar or toast.
    pub fn summary(&self) -> String {
        let action = match self.context {
            NoticeContext::Load => "Loading the list",
            NoticeContext::Create => "Adding the record",
            NoticeContext::Update => "Saving the changes",
            NoticeContext::Delete => "Deleting the record",
        };
        format!("{action} failed; the table shows the last loaded state. ({})", self.message)
    }
}

pub trait NoticeSink: Send + Sync {
    fn publish(&self, notice: Notice);
}

/// Logs every notice at `warn`.
pub struct TracingNotices;

impl NoticeSink for TracingNotices {
    fn publish(&self, notice: Notice) {
        warn!(
            category = ?notice.category,
            context = ?notice.context,
            message = %notice.message,
            "store operation failed"
        );
    }
}

/// Keeps notices until drained by the front-end.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NoticeSink for NoticeLog {
    fn publish(&self, notice: Notice) {
        TracingNotices.publish(notice.clone());
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}
