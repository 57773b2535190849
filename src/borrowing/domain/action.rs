//! Lifecycle actions and the table of states that permit them.

use super::BorrowingState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An operation a party can request on a borrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorrowingAction {
    /// Lender accepts the booking.
    Confirm,
    /// Borrower submits the pickup code.
    SubmitPickupCode,
    /// Lender confirms the item was handed over.
    ConfirmPickup,
    /// Return code generation at the end of the rental.
    IssueReturnCode,
    /// Return code submission at handback.
    SubmitReturnCode,
    /// Either party acknowledges the return.
    ConfirmReturn,
    /// Replaces the currently issued handover code.
    ReissueCode,
    /// Lender resolves the condition check.
    ResolveCondition,
    /// A party asks to write a review.
    RequestReview,
}

impl BorrowingAction {
    /// Returns the states in which this action is legal.
    #[must_use]
    pub const fn permitted_states(self) -> &'static [BorrowingState] {
        match self {
            Self::Confirm => &[BorrowingState::Requested],
            Self::SubmitPickupCode => &[BorrowingState::PickupCodeIssued],
            Self::ConfirmPickup => &[BorrowingState::AwaitingPickupConfirmation],
            Self::IssueReturnCode => &[BorrowingState::Active],
            Self::SubmitReturnCode => &[BorrowingState::ReturnCodeIssued],
            Self::ConfirmReturn => &[
                BorrowingState::ReturnCodeIssued,
                BorrowingState::AwaitingReturnConfirmation,
            ],
            Self::ReissueCode => &[
                BorrowingState::PickupCodeIssued,
                BorrowingState::ReturnCodeIssued,
            ],
            Self::ResolveCondition => &[BorrowingState::ConditionCheckPending],
            Self::RequestReview => &[BorrowingState::Completed],
        }
    }

    /// Returns `true` when this action is legal in `state`.
    #[must_use]
    pub fn is_permitted_in(self, state: BorrowingState) -> bool {
        self.permitted_states().contains(&state)
    }

    /// Returns a stable name for logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::SubmitPickupCode => "submit_pickup_code",
            Self::ConfirmPickup => "confirm_pickup",
            Self::IssueReturnCode => "issue_return_code",
            Self::SubmitReturnCode => "submit_return_code",
            Self::ConfirmReturn => "confirm_return",
            Self::ReissueCode => "reissue_code",
            Self::ResolveCondition => "resolve_condition",
            Self::RequestReview => "request_review",
        }
    }
}

impl fmt::Display for BorrowingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
