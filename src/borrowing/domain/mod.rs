//! Domain model for the borrowing lifecycle.
//!
//! Everything here is pure: transitions mutate a [`BorrowingRecord`] in
//! memory and report rejections as [`BorrowingDomainError`]. Loading,
//! persisting and calling payment or review collaborators happen outside
//! the domain boundary.

mod action;
mod code;
mod error;
mod ids;
mod money;
mod product;
mod record;
mod state;
mod window;

pub use action::BorrowingAction;
pub use code::{CodeKind, CodePolicy, HandoverCode};
pub use error::{BorrowingDomainError, ParseBorrowingStateError};
pub use ids::{BorrowingId, PartyId, PaymentIntentRef, RecordVersion, ReviewRef};
pub use money::MinorUnits;
pub use product::ProductSnapshot;
pub use record::{BorrowingRecord, BorrowingTerms, PersistedBorrowingData, StateChange};
pub use state::BorrowingState;
pub use window::RentalWindow;
