//! Per-record write serialisation.

use crate::borrowing::domain::BorrowingId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Table of async mutexes keyed by borrowing.
///
/// Holding the guard for a borrowing makes the caller its only writer in
/// this process. Entries nobody holds or waits on are pruned on the next
/// acquisition.
#[derive(Debug, Default)]
pub(super) struct RecordLocks {
    table: Mutex<HashMap<BorrowingId, Arc<AsyncMutex<()>>>>,
}

impl RecordLocks {
    pub(super) async fn acquire(&self, id: BorrowingId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            table.retain(|_, mutex| Arc::strong_count(mutex) > 1);
            Arc::clone(table.entry(id).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    pub(super) fn tracked(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
