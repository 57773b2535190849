//! Borrowing lifecycle states.

use super::ParseBorrowingStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage of a borrowing.
///
/// Variants are declared in lifecycle order. A record only ever moves to the
/// immediate successor of its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorrowingState {
    /// Booking created, awaiting lender confirmation.
    Requested,
    /// Lender accepted; the pickup code is being generated.
    Confirmed,
    /// Borrower must submit the pickup code.
    PickupCodeIssued,
    /// Pickup code validated; lender must confirm the handover.
    AwaitingPickupConfirmation,
    /// Item is in the borrower's possession.
    Active,
    /// Return code generated at the end of the rental.
    ReturnCodeIssued,
    /// Lender must confirm receipt of the returned item.
    AwaitingReturnConfirmation,
    /// Lender inspects the item's condition.
    ConditionCheckPending,
    /// Deposit settled; reviews can be written.
    Completed,
}

impl BorrowingState {
    /// Every state in lifecycle order.
    pub const ALL: [Self; 9] = [
        Self::Requested,
        Self::Confirmed,
        Self::PickupCodeIssued,
        Self::AwaitingPickupConfirmation,
        Self::Active,
        Self::ReturnCodeIssued,
        Self::AwaitingReturnConfirmation,
        Self::ConditionCheckPending,
        Self::Completed,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Confirmed => "confirmed",
            Self::PickupCodeIssued => "pickup_code_issued",
            Self::AwaitingPickupConfirmation => "awaiting_pickup_confirmation",
            Self::Active => "active",
            Self::ReturnCodeIssued => "return_code_issued",
            Self::AwaitingReturnConfirmation => "awaiting_return_confirmation",
            Self::ConditionCheckPending => "condition_check_pending",
            Self::Completed => "completed",
        }
    }

    /// Returns the position of the state in lifecycle order, starting at 0.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Requested => 0,
            Self::Confirmed => 1,
            Self::PickupCodeIssued => 2,
            Self::AwaitingPickupConfirmation => 3,
            Self::Active => 4,
            Self::ReturnCodeIssued => 5,
            Self::AwaitingReturnConfirmation => 6,
            Self::ConditionCheckPending => 7,
            Self::Completed => 8,
        }
    }

    /// Returns the state that follows this one, or `None` for the terminal
    /// state.
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::Requested => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::PickupCodeIssued),
            Self::PickupCodeIssued => Some(Self::AwaitingPickupConfirmation),
            Self::AwaitingPickupConfirmation => Some(Self::Active),
            Self::Active => Some(Self::ReturnCodeIssued),
            Self::ReturnCodeIssued => Some(Self::AwaitingReturnConfirmation),
            Self::AwaitingReturnConfirmation => Some(Self::ConditionCheckPending),
            Self::ConditionCheckPending => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Returns `true` when `next` is the immediate successor of this state.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.successor() == Some(next)
    }

    /// Returns `true` for the terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl TryFrom<&str> for BorrowingState {
    type Error = ParseBorrowingStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| ParseBorrowingStateError(value.to_owned()))
    }
}

impl fmt::Display for BorrowingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
