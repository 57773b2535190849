//! Handover code source port.

use crate::borrowing::domain::{BorrowingDomainError, HandoverCode};

/// Source of fresh handover codes.
pub trait CodeGenerator: Send + Sync {
    /// Draws a new code of `length` digits.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingDomainError::MalformedCode`] when `length` is zero.
    fn generate(&self, length: usize) -> Result<HandoverCode, BorrowingDomainError>;
}
