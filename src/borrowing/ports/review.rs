//! Review subsystem port.

use crate::borrowing::domain::BorrowingId;
use async_trait::async_trait;
use thiserror::Error;

/// Receives notice that a borrowing's parties may now review each other.
#[async_trait]
pub trait ReviewNotifier: Send + Sync {
    /// Announces that `borrowing_id` reached completion.
    ///
    /// # Errors
    ///
    /// Returns a [`NotificationError`] when delivery fails. Callers treat the
    /// notification as fire-and-forget.
    async fn review_unlocked(&self, borrowing_id: BorrowingId) -> Result<(), NotificationError>;
}

/// Notification delivery failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("review notification failed: {0}")]
pub struct NotificationError(pub String);
