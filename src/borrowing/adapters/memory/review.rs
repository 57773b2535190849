//! In-memory review notifier.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::borrowing::{
    domain::BorrowingId,
    ports::{NotificationError, ReviewNotifier},
};

/// Review notifier that records every unlocked borrowing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReviewNotifier {
    unlocked: Arc<Mutex<Vec<BorrowingId>>>,
}

impl InMemoryReviewNotifier {
    /// Creates a notifier with no recorded notifications.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the borrowings announced so far, in order.
    #[must_use]
    pub fn unlocked(&self) -> Vec<BorrowingId> {
        self.unlocked
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReviewNotifier for InMemoryReviewNotifier {
    async fn review_unlocked(&self, borrowing_id: BorrowingId) -> Result<(), NotificationError> {
        let mut ids = self
            .unlocked
            .lock()
            .map_err(|err| NotificationError(err.to_string()))?;
        ids.push(borrowing_id);
        Ok(())
    }
}
