//! Repository port for borrowing persistence and lookup.

use crate::borrowing::domain::{BorrowingId, BorrowingRecord, PartyId, RecordVersion};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for borrowing repository operations.
pub type BorrowingRepositoryResult<T> = Result<T, BorrowingRepositoryError>;

/// Borrowing persistence contract.
#[async_trait]
pub trait BorrowingRepository: Send + Sync {
    /// Stores a new borrowing.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingRepositoryError::DuplicateBorrowing`] when the
    /// identifier already exists.
    async fn store(&self, record: &BorrowingRecord) -> BorrowingRepositoryResult<()>;

    /// Replaces a stored borrowing if it is still at `expected`.
    ///
    /// The check and the write are atomic: of two writers that loaded the
    /// same version, exactly one succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingRepositoryError::NotFound`] when the borrowing does
    /// not exist and [`BorrowingRepositoryError::VersionConflict`] when the
    /// stored version differs from `expected`.
    async fn update(
        &self,
        record: &BorrowingRecord,
        expected: RecordVersion,
    ) -> BorrowingRepositoryResult<()>;

    /// Finds a borrowing by identifier.
    ///
    /// Returns `None` when the borrowing does not exist.
    async fn find_by_id(
        &self,
        id: BorrowingId,
    ) -> BorrowingRepositoryResult<Option<BorrowingRecord>>;

    /// Returns every borrowing where `party` is borrower or lender, oldest
    /// first.
    async fn find_by_party(
        &self,
        party: &PartyId,
    ) -> BorrowingRepositoryResult<Vec<BorrowingRecord>>;
}

/// Errors returned by borrowing repository implementations.
#[derive(Debug, Clone, Error)]
pub enum BorrowingRepositoryError {
    /// A borrowing with the same identifier already exists.
    #[error("duplicate borrowing identifier: {0}")]
    DuplicateBorrowing(BorrowingId),

    /// The borrowing was not found.
    #[error("borrowing not found: {0}")]
    NotFound(BorrowingId),

    /// Another writer changed the borrowing since it was loaded.
    #[error(
        "borrowing {borrowing_id} changed concurrently: expected version {expected}, found {actual}"
    )]
    VersionConflict {
        /// Borrowing that was written.
        borrowing_id: BorrowingId,
        /// Version the writer loaded.
        expected: RecordVersion,
        /// Version currently stored.
        actual: RecordVersion,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BorrowingRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
