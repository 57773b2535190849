//! In-memory repository for borrowing records.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::borrowing::{
    domain::{BorrowingId, BorrowingRecord, PartyId, RecordVersion},
    ports::{BorrowingRepository, BorrowingRepositoryError, BorrowingRepositoryResult},
};

/// Thread-safe in-memory borrowing repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBorrowingRepository {
    state: Arc<RwLock<HashMap<BorrowingId, BorrowingRecord>>>,
}

impl InMemoryBorrowingRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: &impl std::fmt::Display) -> BorrowingRepositoryError {
    BorrowingRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl BorrowingRepository for InMemoryBorrowingRepository {
    async fn store(&self, record: &BorrowingRecord) -> BorrowingRepositoryResult<()> {
        let mut records = self.state.write().map_err(|err| poisoned(&err))?;
        if records.contains_key(&record.id()) {
            return Err(BorrowingRepositoryError::DuplicateBorrowing(record.id()));
        }
        records.insert(record.id(), record.clone());
        Ok(())
    }

    async fn update(
        &self,
        record: &BorrowingRecord,
        expected: RecordVersion,
    ) -> BorrowingRepositoryResult<()> {
        let mut records = self.state.write().map_err(|err| poisoned(&err))?;
        let stored = records
            .get_mut(&record.id())
            .ok_or(BorrowingRepositoryError::NotFound(record.id()))?;

        if stored.version() != expected {
            return Err(BorrowingRepositoryError::VersionConflict {
                borrowing_id: record.id(),
                expected,
                actual: stored.version(),
            });
        }
        *stored = record.clone();
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: BorrowingId,
    ) -> BorrowingRepositoryResult<Option<BorrowingRecord>> {
        let records = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(records.get(&id).cloned())
    }

    async fn find_by_party(
        &self,
        party: &PartyId,
    ) -> BorrowingRepositoryResult<Vec<BorrowingRecord>> {
        let records = self.state.read().map_err(|err| poisoned(&err))?;
        let mut found: Vec<BorrowingRecord> = records
            .values()
            .filter(|record| record.involves(party))
            .cloned()
            .collect();
        found.sort_by_key(|record| (record.created_at(), record.id()));
        Ok(found)
    }
}
