//! Error types for borrowing validation, transitions and parsing.

use super::{BorrowingAction, BorrowingId, BorrowingState, CodeKind, PartyId};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned while constructing borrowing values or applying
/// lifecycle transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BorrowingDomainError {
    /// A borrower or lender identifier is empty after trimming.
    #[error("party identifier must not be empty")]
    EmptyPartyId,

    /// Borrower and lender are the same party.
    #[error("party {0} cannot borrow from themselves")]
    SameParty(PartyId),

    /// The payment intent reference is empty after trimming.
    #[error("payment intent reference must not be empty")]
    EmptyPaymentIntent,

    /// The product title is empty after trimming.
    #[error("product title must not be empty")]
    EmptyProductTitle,

    /// A handover code is empty or contains non-digit characters.
    #[error("handover code must be a non-empty string of ASCII digits")]
    MalformedCode,

    /// The rental window does not end after it starts.
    #[error("rental window must end after it starts ({start} .. {end})")]
    InvalidRentalWindow {
        /// Requested start of the rental.
        start: DateTime<Utc>,
        /// Requested end of the rental.
        end: DateTime<Utc>,
    },

    /// The action is not legal in the record's current state.
    #[error("cannot {action} borrowing {borrowing_id} while it is {state}")]
    InvalidTransition {
        /// Borrowing the action targeted.
        borrowing_id: BorrowingId,
        /// State the record was in.
        state: BorrowingState,
        /// Rejected action.
        action: BorrowingAction,
    },

    /// A submitted handover code did not match the issued one.
    #[error("{kind} code does not match for borrowing {borrowing_id}")]
    CodeMismatch {
        /// Borrowing the code was submitted for.
        borrowing_id: BorrowingId,
        /// Which code was submitted.
        kind: CodeKind,
        /// Attempts left before lockout, when a limit is configured.
        remaining_attempts: Option<u32>,
    },

    /// The wrong-code attempt limit has been reached for the issued code.
    #[error("{kind} code attempts exhausted for borrowing {borrowing_id}; reissue the code")]
    CodeAttemptsExhausted {
        /// Borrowing the code was submitted for.
        borrowing_id: BorrowingId,
        /// Which code is locked.
        kind: CodeKind,
    },
}

/// Error returned while parsing borrowing states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown borrowing state: {0}")]
pub struct ParseBorrowingStateError(pub String);
