//! Service layer for borrowing creation, transitions and settlement.

use super::{LifecycleConfig, LifecycleConfigError, locks::RecordLocks};
use crate::borrowing::{
    adapters::random::RandomCodeGenerator,
    domain::{
        BorrowingAction, BorrowingDomainError, BorrowingId, BorrowingRecord, BorrowingTerms,
        CodeKind, MinorUnits, PartyId, PaymentIntentRef, ProductSnapshot, RentalWindow, ReviewRef,
    },
    ports::{
        BorrowingRepository, BorrowingRepositoryError, CodeGenerator, PaymentGateway,
        RefundReceipt, RefundRequest, ReviewNotifier,
    },
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Request payload for recording a new booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBorrowingRequest {
    borrower_id: String,
    lender_id: String,
    payment_intent: String,
    product_id: String,
    title: String,
    daily_rate: u64,
    location: Option<String>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    total: u64,
    deposit: u64,
}

impl CreateBorrowingRequest {
    /// Creates a request with the required booking fields.
    ///
    /// Amounts default to zero until set with [`Self::with_amounts`].
    #[must_use]
    pub fn new(
        borrower_id: impl Into<String>,
        lender_id: impl Into<String>,
        payment_intent: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            borrower_id: borrower_id.into(),
            lender_id: lender_id.into(),
            payment_intent: payment_intent.into(),
            product_id: String::new(),
            title: title.into(),
            daily_rate: 0,
            location: None,
            start,
            end,
            total: 0,
            deposit: 0,
        }
    }

    /// Sets the listing identifier and daily rate.
    #[must_use]
    pub fn with_listing(mut self, product_id: impl Into<String>, daily_rate: u64) -> Self {
        self.product_id = product_id.into();
        self.daily_rate = daily_rate;
        self
    }

    /// Sets the pickup location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the total charged and the refundable deposit, in minor units.
    #[must_use]
    pub const fn with_amounts(mut self, total: u64, deposit: u64) -> Self {
        self.total = total;
        self.deposit = deposit;
        self
    }

    fn into_terms(self) -> Result<BorrowingTerms, BorrowingDomainError> {
        let mut product =
            ProductSnapshot::new(self.product_id, self.title, MinorUnits::new(self.daily_rate))?;
        if let Some(location) = self.location {
            product = product.with_location(location);
        }
        Ok(BorrowingTerms {
            borrower_id: PartyId::new(self.borrower_id)?,
            lender_id: PartyId::new(self.lender_id)?,
            product,
            window: RentalWindow::new(self.start, self.end)?,
            total: MinorUnits::new(self.total),
            deposit: MinorUnits::new(self.deposit),
            payment_intent: PaymentIntentRef::new(self.payment_intent)?,
        })
    }
}

/// Outcome of resolving a condition check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionResolution {
    /// The deposit was settled and the borrowing completed.
    Settled(BorrowingRecord),
    /// The lender did not approve the item's condition. No transition was
    /// made; the borrowing stays pending until a dispute is handled.
    Disputed(BorrowingRecord),
}

impl ConditionResolution {
    /// Returns the record after resolution.
    #[must_use]
    pub const fn record(&self) -> &BorrowingRecord {
        match self {
            Self::Settled(record) | Self::Disputed(record) => record,
        }
    }

    /// Returns `true` when the deposit was settled.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Settled(_))
    }
}

/// Service-level errors for borrowing lifecycle operations.
#[derive(Debug, Error)]
pub enum BorrowingLifecycleError {
    /// Domain validation or transition rules rejected the request.
    #[error(transparent)]
    Domain(#[from] BorrowingDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] BorrowingRepositoryError),
    /// The borrowing does not exist.
    #[error("borrowing not found: {0}")]
    NotFound(BorrowingId),
    /// The payment gateway did not refund the deposit. The borrowing is
    /// unchanged and the call may be retried.
    #[error("deposit refund failed for borrowing {borrowing_id}: {reason}")]
    RefundFailed {
        /// Borrowing being settled.
        borrowing_id: BorrowingId,
        /// Gateway failure description.
        reason: String,
    },
}

/// Coarse classification of [`BorrowingLifecycleError`] for callers that
/// present errors to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleErrorKind {
    /// Booking input was invalid.
    Validation,
    /// The action is not legal in the current state.
    InvalidTransition,
    /// A submitted handover code was wrong.
    CodeMismatch,
    /// The handover code is locked until reissued.
    CodeLocked,
    /// The deposit refund failed.
    RefundFailed,
    /// Another writer changed the borrowing first.
    PersistenceConflict,
    /// The borrowing does not exist.
    NotFound,
    /// The store failed.
    Storage,
}

impl BorrowingLifecycleError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> LifecycleErrorKind {
        match self {
            Self::Domain(BorrowingDomainError::InvalidTransition { .. }) => {
                LifecycleErrorKind::InvalidTransition
            }
            Self::Domain(BorrowingDomainError::CodeMismatch { .. }) => {
                LifecycleErrorKind::CodeMismatch
            }
            Self::Domain(BorrowingDomainError::CodeAttemptsExhausted { .. }) => {
                LifecycleErrorKind::CodeLocked
            }
            Self::Domain(_) => LifecycleErrorKind::Validation,
            Self::Repository(BorrowingRepositoryError::VersionConflict { .. }) => {
                LifecycleErrorKind::PersistenceConflict
            }
            Self::Repository(BorrowingRepositoryError::NotFound(_)) | Self::NotFound(_) => {
                LifecycleErrorKind::NotFound
            }
            Self::Repository(_) => LifecycleErrorKind::Storage,
            Self::RefundFailed { .. } => LifecycleErrorKind::RefundFailed,
        }
    }

    /// Returns `true` when repeating the request (after reloading, for
    /// conflicts) can succeed without other changes.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            LifecycleErrorKind::CodeMismatch
                | LifecycleErrorKind::RefundFailed
                | LifecycleErrorKind::PersistenceConflict
                | LifecycleErrorKind::Storage
        )
    }
}

/// Result type for borrowing lifecycle service operations.
pub type BorrowingLifecycleResult<T> = Result<T, BorrowingLifecycleError>;

/// Borrowing lifecycle orchestration service.
///
/// Each operation loads the record, applies one domain transition and
/// persists the result under a per-record lock, guarded by the version the
/// record was loaded at.
pub struct BorrowingLifecycleService<R, C>
where
    R: BorrowingRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    payments: Arc<dyn PaymentGateway>,
    reviews: Arc<dyn ReviewNotifier>,
    codes: Arc<dyn CodeGenerator>,
    config: LifecycleConfig,
    locks: Arc<RecordLocks>,
}

// Clones share the lock table, so no `R: Clone` or `C: Clone` bound.
impl<R, C> Clone for BorrowingLifecycleService<R, C>
where
    R: BorrowingRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            payments: Arc::clone(&self.payments),
            reviews: Arc::clone(&self.reviews),
            codes: Arc::clone(&self.codes),
            config: self.config.clone(),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<R, C> BorrowingLifecycleService<R, C>
where
    R: BorrowingRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service with random handover codes and the default
    /// configuration.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        clock: Arc<C>,
        payments: Arc<dyn PaymentGateway>,
        reviews: Arc<dyn ReviewNotifier>,
    ) -> Self {
        Self {
            repository,
            clock,
            payments,
            reviews,
            codes: Arc::new(RandomCodeGenerator),
            config: LifecycleConfig::default(),
            locks: Arc::new(RecordLocks::default()),
        }
    }

    /// Replaces the handover code source.
    #[must_use]
    pub fn with_code_generator(mut self, codes: Arc<dyn CodeGenerator>) -> Self {
        self.codes = codes;
        self
    }

    /// Replaces the configuration after validating it.
    ///
    /// # Errors
    ///
    /// Returns the [`LifecycleConfig::validate`] error when the settings are
    /// out of range.
    pub fn with_config(mut self, config: LifecycleConfig) -> Result<Self, LifecycleConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Records a new booking in the requested state.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingLifecycleError::Domain`] when the booking terms are
    /// invalid or [`BorrowingLifecycleError::Repository`] when persistence
    /// fails.
    #[instrument(skip(self, request))]
    pub async fn create_request(
        &self,
        request: CreateBorrowingRequest,
    ) -> BorrowingLifecycleResult<BorrowingRecord> {
        let terms = request.into_terms()?;
        let record = BorrowingRecord::new_request(terms, &*self.clock)?;
        self.repository.store(&record).await?;
        info!(borrowing_id = %record.id(), "borrowing requested");
        Ok(record)
    }

    /// Retrieves a borrowing by identifier.
    ///
    /// Returns `Ok(None)` when the borrowing does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingLifecycleError::Repository`] when lookup fails.
    pub async fn find_by_id(
        &self,
        id: BorrowingId,
    ) -> BorrowingLifecycleResult<Option<BorrowingRecord>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Lists the borrowings a party takes part in, as borrower or lender.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingLifecycleError::Repository`] when lookup fails.
    pub async fn find_by_party(
        &self,
        party: &PartyId,
    ) -> BorrowingLifecycleResult<Vec<BorrowingRecord>> {
        Ok(self.repository.find_by_party(party).await?)
    }

    /// Lender accepts the booking; the pickup code is issued.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleErrorKind::InvalidTransition`] unless the borrowing
    /// is requested, plus the lookup and persistence errors shared by all
    /// transitions.
    #[instrument(skip(self), fields(borrowing_id = %id))]
    pub async fn confirm(&self, id: BorrowingId) -> BorrowingLifecycleResult<BorrowingRecord> {
        let length = self.config.code_length;
        self.apply(id, BorrowingAction::Confirm, |record, clock| {
            let code = self.codes.generate(length)?;
            record.confirm(code, clock)
        })
        .await
        .map(|(record, ())| record)
    }

    /// Borrower submits the pickup code.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleErrorKind::CodeMismatch`] for a wrong code,
    /// [`LifecycleErrorKind::CodeLocked`] once the attempt limit is reached
    /// and [`LifecycleErrorKind::InvalidTransition`] outside the pickup-code
    /// stage.
    #[instrument(skip(self, candidate), fields(borrowing_id = %id))]
    pub async fn submit_pickup_code(
        &self,
        id: BorrowingId,
        candidate: &str,
    ) -> BorrowingLifecycleResult<BorrowingRecord> {
        let policy = self.config.code_policy();
        self.apply(id, BorrowingAction::SubmitPickupCode, |record, clock| {
            record.submit_pickup_code(candidate, &policy, clock)
        })
        .await
        .map(|(record, ())| record)
    }

    /// Lender confirms the handover; the rental becomes active.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleErrorKind::InvalidTransition`] unless the pickup
    /// code has been accepted.
    #[instrument(skip(self), fields(borrowing_id = %id))]
    pub async fn confirm_pickup(
        &self,
        id: BorrowingId,
    ) -> BorrowingLifecycleResult<BorrowingRecord> {
        self.apply(id, BorrowingAction::ConfirmPickup, |record, clock| {
            record.confirm_pickup(clock)
        })
        .await
        .map(|(record, ())| record)
    }

    /// Issues the return code when the rental ends.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleErrorKind::InvalidTransition`] unless the rental is
    /// active.
    #[instrument(skip(self), fields(borrowing_id = %id))]
    pub async fn issue_return_code(
        &self,
        id: BorrowingId,
    ) -> BorrowingLifecycleResult<BorrowingRecord> {
        let length = self.config.code_length;
        self.apply(id, BorrowingAction::IssueReturnCode, |record, clock| {
            let code = self.codes.generate(length)?;
            record.issue_return_code(code, clock)
        })
        .await
        .map(|(record, ())| record)
    }

    /// Submits the return code at handback.
    ///
    /// # Errors
    ///
    /// As [`Self::submit_pickup_code`], for the return-code stage.
    #[instrument(skip(self, candidate), fields(borrowing_id = %id))]
    pub async fn submit_return_code(
        &self,
        id: BorrowingId,
        candidate: &str,
    ) -> BorrowingLifecycleResult<BorrowingRecord> {
        let policy = self.config.code_policy();
        self.apply(id, BorrowingAction::SubmitReturnCode, |record, clock| {
            record.submit_return_code(candidate, &policy, clock)
        })
        .await
        .map(|(record, ())| record)
    }

    /// Acknowledges the return; the second acknowledgement starts the
    /// condition check.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleErrorKind::InvalidTransition`] outside the return
    /// stages.
    #[instrument(skip(self), fields(borrowing_id = %id))]
    pub async fn confirm_return(
        &self,
        id: BorrowingId,
    ) -> BorrowingLifecycleResult<BorrowingRecord> {
        self.apply(id, BorrowingAction::ConfirmReturn, |record, clock| {
            record.confirm_return(clock)
        })
        .await
        .map(|(record, ())| record)
    }

    /// Replaces the code awaiting submission, lifting any attempt lockout.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleErrorKind::InvalidTransition`] unless a pickup or
    /// return code is awaiting submission.
    #[instrument(skip(self), fields(borrowing_id = %id))]
    pub async fn reissue_code(
        &self,
        id: BorrowingId,
    ) -> BorrowingLifecycleResult<(BorrowingRecord, CodeKind)> {
        let length = self.config.code_length;
        self.apply(id, BorrowingAction::ReissueCode, |record, clock| {
            let code = self.codes.generate(length)?;
            record.reissue_code(code, clock)
        })
        .await
    }

    /// Resolves the lender's condition check.
    ///
    /// Approval refunds the deposit and completes the borrowing, then
    /// announces the review unlock. Disapproval makes no transition.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleErrorKind::InvalidTransition`] outside the
    /// condition check and [`BorrowingLifecycleError::RefundFailed`] when the
    /// gateway fails or times out; the borrowing is then unchanged.
    ///
    /// The review notification is sent after the record's lock is released.
    #[instrument(skip(self), fields(borrowing_id = %id))]
    pub async fn resolve_condition(
        &self,
        id: BorrowingId,
        approved: bool,
    ) -> BorrowingLifecycleResult<ConditionResolution> {
        let guard = self.locks.acquire(id).await;
        let loaded = self.load(id).await?;
        loaded.ensure_condition_pending()?;

        if !approved {
            warn!(borrowing_id = %id, "condition check not approved; awaiting dispute handling");
            return Ok(ConditionResolution::Disputed(loaded));
        }

        let refund_ref = if loaded.deposit().is_zero() {
            None
        } else {
            Some(self.refund_deposit(&loaded).await?.reference)
        };

        let mut record = loaded.clone();
        record.complete_settlement(refund_ref, &*self.clock)?;
        self.repository.update(&record, loaded.version()).await?;
        info!(
            borrowing_id = %id,
            deposit = %record.deposit(),
            "deposit settled; borrowing completed"
        );

        drop(guard);
        self.announce_review_unlock(id).await;
        Ok(ConditionResolution::Settled(record))
    }

    /// Returns the review reference for a completed borrowing, creating it on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleErrorKind::InvalidTransition`] unless the borrowing
    /// is completed.
    #[instrument(skip(self), fields(borrowing_id = %id))]
    pub async fn request_review(&self, id: BorrowingId) -> BorrowingLifecycleResult<ReviewRef> {
        self.apply(id, BorrowingAction::RequestReview, |record, clock| {
            record.request_review(clock).map(|(review_ref, _)| review_ref)
        })
        .await
        .map(|(_, review_ref)| review_ref)
    }

    /// Runs one domain transition under the record's lock.
    ///
    /// The record is written back only when the transition changed it, which
    /// includes a rejected code submission that counted against the attempt
    /// limit. Actions the loaded state does not permit are rejected before
    /// the transition runs, so no code is drawn for them.
    async fn apply<T, F>(
        &self,
        id: BorrowingId,
        action: BorrowingAction,
        transition: F,
    ) -> BorrowingLifecycleResult<(BorrowingRecord, T)>
    where
        F: FnOnce(&mut BorrowingRecord, &C) -> Result<T, BorrowingDomainError>,
    {
        let _guard = self.locks.acquire(id).await;
        let loaded = self.load(id).await?;
        if !loaded.permits(action) {
            let err = BorrowingDomainError::InvalidTransition {
                borrowing_id: id,
                state: loaded.state(),
                action,
            };
            log_rejection(id, action, &err);
            return Err(err.into());
        }

        let mut record = loaded.clone();
        let outcome = transition(&mut record, &*self.clock);

        if record.version() != loaded.version() {
            self.repository.update(&record, loaded.version()).await?;
        }

        match outcome {
            Ok(value) => {
                info!(
                    borrowing_id = %id,
                    action = %action,
                    from = %loaded.state(),
                    to = %record.state(),
                    version = %record.version(),
                    "borrowing transition applied"
                );
                Ok((record, value))
            }
            Err(err) => {
                log_rejection(id, action, &err);
                Err(err.into())
            }
        }
    }

    async fn load(&self, id: BorrowingId) -> BorrowingLifecycleResult<BorrowingRecord> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(BorrowingLifecycleError::NotFound(id))
    }

    async fn refund_deposit(
        &self,
        record: &BorrowingRecord,
    ) -> BorrowingLifecycleResult<RefundReceipt> {
        let request = RefundRequest {
            borrowing_id: record.id(),
            payment_intent: record.payment_intent().clone(),
            amount: record.deposit(),
        };
        let timeout = self.config.collaborator_timeout();
        let reason = match tokio::time::timeout(timeout, self.payments.refund(&request)).await {
            Ok(Ok(receipt)) => return Ok(receipt),
            Ok(Err(err)) => err.to_string(),
            Err(_) => format!("payment gateway timed out after {timeout:?}"),
        };
        warn!(borrowing_id = %record.id(), %reason, "deposit refund failed");
        Err(BorrowingLifecycleError::RefundFailed {
            borrowing_id: record.id(),
            reason,
        })
    }

    async fn announce_review_unlock(&self, id: BorrowingId) {
        let timeout = self.config.collaborator_timeout();
        match tokio::time::timeout(timeout, self.reviews.review_unlocked(id)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(borrowing_id = %id, error = %err, "review unlock not delivered"),
            Err(_) => warn!(borrowing_id = %id, "review unlock notification timed out"),
        }
    }
}

fn log_rejection(id: BorrowingId, action: BorrowingAction, err: &BorrowingDomainError) {
    match err {
        BorrowingDomainError::CodeMismatch {
            remaining_attempts, ..
        } => warn!(
            borrowing_id = %id,
            action = %action,
            remaining_attempts = ?remaining_attempts,
            "handover code rejected"
        ),
        BorrowingDomainError::CodeAttemptsExhausted { .. } => warn!(
            borrowing_id = %id,
            action = %action,
            "handover code locked after too many attempts"
        ),
        other => info!(
            borrowing_id = %id,
            action = %action,
            reason = %other,
            "transition rejected"
        ),
    }
}
