//! Borrowing aggregate root and its lifecycle transitions.

use super::{
    BorrowingAction, BorrowingDomainError, BorrowingId, BorrowingState, CodeKind, CodePolicy,
    HandoverCode, MinorUnits, PartyId, PaymentIntentRef, ProductSnapshot, RecordVersion,
    RentalWindow, ReviewRef,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Booking terms agreed when the borrower books an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowingTerms {
    /// Party renting the item.
    pub borrower_id: PartyId,
    /// Party who owns and lists the item.
    pub lender_id: PartyId,
    /// Listing snapshot at booking time.
    pub product: ProductSnapshot,
    /// Rental period.
    pub window: RentalWindow,
    /// Total charged to the borrower.
    pub total: MinorUnits,
    /// Refundable deposit included in the charge.
    pub deposit: MinorUnits,
    /// Gateway reference of the charge.
    pub payment_intent: PaymentIntentRef,
}

/// One recorded step through the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    /// State before the step.
    pub from: BorrowingState,
    /// State after the step.
    pub to: BorrowingState,
    /// When the step happened.
    pub at: DateTime<Utc>,
}

/// Borrowing aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowingRecord {
    id: BorrowingId,
    borrower_id: PartyId,
    lender_id: PartyId,
    product: ProductSnapshot,
    window: RentalWindow,
    total: MinorUnits,
    deposit: MinorUnits,
    payment_intent: PaymentIntentRef,
    state: BorrowingState,
    pickup_code: Option<HandoverCode>,
    return_code: Option<HandoverCode>,
    failed_code_attempts: u32,
    refund_ref: Option<String>,
    review_ref: Option<ReviewRef>,
    history: Vec<StateChange>,
    version: RecordVersion,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted borrowing aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedBorrowingData {
    /// Persisted borrowing identifier.
    pub id: BorrowingId,
    /// Persisted booking terms.
    pub terms: BorrowingTerms,
    /// Persisted lifecycle state.
    pub state: BorrowingState,
    /// Persisted pickup code, if currently issued.
    pub pickup_code: Option<HandoverCode>,
    /// Persisted return code, if currently issued.
    pub return_code: Option<HandoverCode>,
    /// Persisted wrong-code attempt counter.
    pub failed_code_attempts: u32,
    /// Persisted refund reference, if settled.
    pub refund_ref: Option<String>,
    /// Persisted review reference, if requested.
    pub review_ref: Option<ReviewRef>,
    /// Persisted transition history.
    pub history: Vec<StateChange>,
    /// Persisted record version.
    pub version: RecordVersion,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl BorrowingRecord {
    /// Creates a new borrowing in [`BorrowingState::Requested`].
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingDomainError::SameParty`] when borrower and lender
    /// are the same party.
    pub fn new_request(
        terms: BorrowingTerms,
        clock: &impl Clock,
    ) -> Result<Self, BorrowingDomainError> {
        if terms.borrower_id == terms.lender_id {
            return Err(BorrowingDomainError::SameParty(terms.borrower_id));
        }
        let timestamp = clock.utc();
        let BorrowingTerms {
            borrower_id,
            lender_id,
            product,
            window,
            total,
            deposit,
            payment_intent,
        } = terms;

        Ok(Self {
            id: BorrowingId::new(),
            borrower_id,
            lender_id,
            product,
            window,
            total,
            deposit,
            payment_intent,
            state: BorrowingState::Requested,
            pickup_code: None,
            return_code: None,
            failed_code_attempts: 0,
            refund_ref: None,
            review_ref: None,
            history: Vec::new(),
            version: RecordVersion::INITIAL,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a borrowing from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedBorrowingData) -> Self {
        let PersistedBorrowingData {
            id,
            terms,
            state,
            pickup_code,
            return_code,
            failed_code_attempts,
            refund_ref,
            review_ref,
            history,
            version,
            created_at,
            updated_at,
        } = data;
        Self {
            id,
            borrower_id: terms.borrower_id,
            lender_id: terms.lender_id,
            product: terms.product,
            window: terms.window,
            total: terms.total,
            deposit: terms.deposit,
            payment_intent: terms.payment_intent,
            state,
            pickup_code,
            return_code,
            failed_code_attempts,
            refund_ref,
            review_ref,
            history,
            version,
            created_at,
            updated_at,
        }
    }

    /// Returns the borrowing identifier.
    #[must_use]
    pub const fn id(&self) -> BorrowingId {
        self.id
    }

    /// Returns the borrower.
    #[must_use]
    pub const fn borrower_id(&self) -> &PartyId {
        &self.borrower_id
    }

    /// Returns the lender.
    #[must_use]
    pub const fn lender_id(&self) -> &PartyId {
        &self.lender_id
    }

    /// Returns `true` when `party` is the borrower or the lender.
    #[must_use]
    pub fn involves(&self, party: &PartyId) -> bool {
        self.borrower_id == *party || self.lender_id == *party
    }

    /// Returns the product snapshot.
    #[must_use]
    pub const fn product(&self) -> &ProductSnapshot {
        &self.product
    }

    /// Returns the rental window.
    #[must_use]
    pub const fn window(&self) -> &RentalWindow {
        &self.window
    }

    /// Returns the total charged.
    #[must_use]
    pub const fn total(&self) -> MinorUnits {
        self.total
    }

    /// Returns the refundable deposit.
    #[must_use]
    pub const fn deposit(&self) -> MinorUnits {
        self.deposit
    }

    /// Returns the payment intent reference.
    #[must_use]
    pub const fn payment_intent(&self) -> &PaymentIntentRef {
        &self.payment_intent
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> BorrowingState {
        self.state
    }

    /// Returns the issued pickup code, if any.
    #[must_use]
    pub const fn pickup_code(&self) -> Option<&HandoverCode> {
        self.pickup_code.as_ref()
    }

    /// Returns the issued return code, if any.
    #[must_use]
    pub const fn return_code(&self) -> Option<&HandoverCode> {
        self.return_code.as_ref()
    }

    /// Returns the wrong submissions made against the issued code.
    #[must_use]
    pub const fn failed_code_attempts(&self) -> u32 {
        self.failed_code_attempts
    }

    /// Returns the gateway reference of the deposit refund, if settled.
    #[must_use]
    pub fn refund_ref(&self) -> Option<&str> {
        self.refund_ref.as_deref()
    }

    /// Returns the review reference, if a review was requested.
    #[must_use]
    pub const fn review_ref(&self) -> Option<ReviewRef> {
        self.review_ref
    }

    /// Returns every recorded transition, oldest first.
    #[must_use]
    pub fn history(&self) -> &[StateChange] {
        &self.history
    }

    /// Returns the record version.
    #[must_use]
    pub const fn version(&self) -> RecordVersion {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when `action` is legal in the current state.
    #[must_use]
    pub fn permits(&self, action: BorrowingAction) -> bool {
        action.is_permitted_in(self.state)
    }

    /// Lender accepts the booking and the pickup code is issued.
    ///
    /// Passes through [`BorrowingState::Confirmed`] and settles in
    /// [`BorrowingState::PickupCodeIssued`] once the code is stored.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingDomainError::InvalidTransition`] unless the record
    /// is [`BorrowingState::Requested`].
    pub fn confirm(
        &mut self,
        pickup_code: HandoverCode,
        clock: &impl Clock,
    ) -> Result<(), BorrowingDomainError> {
        self.ensure_permitted(BorrowingAction::Confirm)?;
        let at = clock.utc();
        self.advance(BorrowingAction::Confirm, at)?;
        self.pickup_code = Some(pickup_code);
        self.failed_code_attempts = 0;
        self.advance(BorrowingAction::Confirm, at)?;
        self.touch(at);
        Ok(())
    }

    /// Checks the borrower's pickup code and consumes it on a match.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingDomainError::InvalidTransition`] outside
    /// [`BorrowingState::PickupCodeIssued`],
    /// [`BorrowingDomainError::CodeMismatch`] on a wrong code and
    /// [`BorrowingDomainError::CodeAttemptsExhausted`] once the policy's
    /// attempt limit is reached.
    pub fn submit_pickup_code(
        &mut self,
        candidate: &str,
        policy: &CodePolicy,
        clock: &impl Clock,
    ) -> Result<(), BorrowingDomainError> {
        self.submit_code(CodeKind::Pickup, candidate, policy, clock)
    }

    /// Lender confirms the item was handed over; the rental becomes active.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingDomainError::InvalidTransition`] outside
    /// [`BorrowingState::AwaitingPickupConfirmation`].
    pub fn confirm_pickup(&mut self, clock: &impl Clock) -> Result<(), BorrowingDomainError> {
        self.ensure_permitted(BorrowingAction::ConfirmPickup)?;
        let at = clock.utc();
        self.advance(BorrowingAction::ConfirmPickup, at)?;
        self.touch(at);
        Ok(())
    }

    /// Issues the return code at the end of the rental.
    ///
    /// The code is drawn independently of the consumed pickup code.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingDomainError::InvalidTransition`] outside
    /// [`BorrowingState::Active`].
    pub fn issue_return_code(
        &mut self,
        return_code: HandoverCode,
        clock: &impl Clock,
    ) -> Result<(), BorrowingDomainError> {
        self.ensure_permitted(BorrowingAction::IssueReturnCode)?;
        let at = clock.utc();
        self.advance(BorrowingAction::IssueReturnCode, at)?;
        self.return_code = Some(return_code);
        self.failed_code_attempts = 0;
        self.touch(at);
        Ok(())
    }

    /// Checks the return code and consumes it on a match.
    ///
    /// # Errors
    ///
    /// Same as [`Self::submit_pickup_code`], for
    /// [`BorrowingState::ReturnCodeIssued`].
    pub fn submit_return_code(
        &mut self,
        candidate: &str,
        policy: &CodePolicy,
        clock: &impl Clock,
    ) -> Result<(), BorrowingDomainError> {
        self.submit_code(CodeKind::Return, candidate, policy, clock)
    }

    /// Acknowledges the return.
    ///
    /// From [`BorrowingState::ReturnCodeIssued`] the first acknowledgement
    /// moves the record to [`BorrowingState::AwaitingReturnConfirmation`] and
    /// invalidates the unused return code. From there the lender's
    /// confirmation moves it to [`BorrowingState::ConditionCheckPending`].
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingDomainError::InvalidTransition`] in any other
    /// state.
    pub fn confirm_return(&mut self, clock: &impl Clock) -> Result<(), BorrowingDomainError> {
        self.ensure_permitted(BorrowingAction::ConfirmReturn)?;
        let at = clock.utc();
        if self.state == BorrowingState::ReturnCodeIssued {
            self.return_code = None;
            self.failed_code_attempts = 0;
        }
        self.advance(BorrowingAction::ConfirmReturn, at)?;
        self.touch(at);
        Ok(())
    }

    /// Replaces the code of the current code stage and resets the attempt
    /// counter.
    ///
    /// Returns which code was replaced.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingDomainError::InvalidTransition`] unless a pickup or
    /// return code is awaiting submission.
    pub fn reissue_code(
        &mut self,
        code: HandoverCode,
        clock: &impl Clock,
    ) -> Result<CodeKind, BorrowingDomainError> {
        self.ensure_permitted(BorrowingAction::ReissueCode)?;
        let kind = if self.state == BorrowingState::PickupCodeIssued {
            self.pickup_code = Some(code);
            CodeKind::Pickup
        } else {
            self.return_code = Some(code);
            CodeKind::Return
        };
        self.failed_code_attempts = 0;
        self.touch(clock.utc());
        Ok(kind)
    }

    /// Checks that the condition check may be resolved now.
    ///
    /// Used before any settlement side effect so that nothing is refunded
    /// for a record in the wrong state.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingDomainError::InvalidTransition`] outside
    /// [`BorrowingState::ConditionCheckPending`].
    pub fn ensure_condition_pending(&self) -> Result<(), BorrowingDomainError> {
        self.ensure_permitted(BorrowingAction::ResolveCondition)
    }

    /// Records the settled deposit and completes the borrowing.
    ///
    /// `refund_ref` is `None` when there was no deposit to refund.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingDomainError::InvalidTransition`] outside
    /// [`BorrowingState::ConditionCheckPending`].
    pub fn complete_settlement(
        &mut self,
        refund_ref: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), BorrowingDomainError> {
        self.ensure_condition_pending()?;
        let at = clock.utc();
        self.advance(BorrowingAction::ResolveCondition, at)?;
        self.refund_ref = refund_ref;
        self.touch(at);
        Ok(())
    }

    /// Unlocks the review for a completed borrowing.
    ///
    /// Returns the review reference and whether it was created by this call.
    /// Repeated calls return the existing reference without modifying the
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingDomainError::InvalidTransition`] outside
    /// [`BorrowingState::Completed`].
    pub fn request_review(
        &mut self,
        clock: &impl Clock,
    ) -> Result<(ReviewRef, bool), BorrowingDomainError> {
        self.ensure_permitted(BorrowingAction::RequestReview)?;
        if let Some(existing) = self.review_ref {
            return Ok((existing, false));
        }
        let review_ref = ReviewRef::new();
        self.review_ref = Some(review_ref);
        self.touch(clock.utc());
        Ok((review_ref, true))
    }

    fn submit_code(
        &mut self,
        kind: CodeKind,
        candidate: &str,
        policy: &CodePolicy,
        clock: &impl Clock,
    ) -> Result<(), BorrowingDomainError> {
        let action = match kind {
            CodeKind::Pickup => BorrowingAction::SubmitPickupCode,
            CodeKind::Return => BorrowingAction::SubmitReturnCode,
        };
        self.ensure_permitted(action)?;
        if policy.is_exhausted(self.failed_code_attempts) {
            return Err(BorrowingDomainError::CodeAttemptsExhausted {
                borrowing_id: self.id,
                kind,
            });
        }

        let slot = match kind {
            CodeKind::Pickup => &mut self.pickup_code,
            CodeKind::Return => &mut self.return_code,
        };
        let at = clock.utc();
        if slot.as_ref().is_some_and(|code| code.matches(candidate)) {
            *slot = None;
            self.failed_code_attempts = 0;
            self.advance(action, at)?;
            self.touch(at);
            return Ok(());
        }

        if policy.max_attempts.is_some() {
            self.failed_code_attempts = self.failed_code_attempts.saturating_add(1);
            self.touch(at);
        }
        Err(BorrowingDomainError::CodeMismatch {
            borrowing_id: self.id,
            kind,
            remaining_attempts: policy.remaining_after(self.failed_code_attempts),
        })
    }

    fn ensure_permitted(&self, action: BorrowingAction) -> Result<(), BorrowingDomainError> {
        if self.permits(action) {
            Ok(())
        } else {
            Err(self.invalid_transition(action))
        }
    }

    const fn invalid_transition(&self, action: BorrowingAction) -> BorrowingDomainError {
        BorrowingDomainError::InvalidTransition {
            borrowing_id: self.id,
            state: self.state,
            action,
        }
    }

    /// Moves to the immediate successor state and records the step.
    fn advance(
        &mut self,
        action: BorrowingAction,
        at: DateTime<Utc>,
    ) -> Result<(), BorrowingDomainError> {
        let Some(next) = self.state.successor() else {
            return Err(self.invalid_transition(action));
        };
        self.history.push(StateChange {
            from: self.state,
            to: next,
            at,
        });
        self.state = next;
        Ok(())
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
        self.version = self.version.next();
    }
}
