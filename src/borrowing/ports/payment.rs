//! Payment gateway port used to settle deposits.

use crate::borrowing::domain::{BorrowingId, MinorUnits, PaymentIntentRef};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for payment gateway operations.
pub type PaymentResult<T> = Result<T, PaymentError>;

/// Deposit refund request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRequest {
    /// Borrowing being settled; doubles as the idempotency key.
    pub borrowing_id: BorrowingId,
    /// Charge the refund is issued against.
    pub payment_intent: PaymentIntentRef,
    /// Amount to refund in minor units.
    pub amount: MinorUnits,
}

impl RefundRequest {
    /// Returns the idempotency key sent to the gateway.
    #[must_use]
    pub fn idempotency_key(&self) -> String {
        format!("deposit-refund-{}", self.borrowing_id)
    }
}

/// Confirmation of an issued refund.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundReceipt {
    /// Gateway reference of the refund.
    pub reference: String,
}

/// Payment gateway contract.
///
/// Implementations must be idempotent per [`RefundRequest::borrowing_id`]:
/// retrying a refund for the same borrowing must not refund twice.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Refunds `request.amount` against `request.payment_intent`.
    ///
    /// # Errors
    ///
    /// Returns a [`PaymentError`] when the gateway declines or cannot be
    /// reached.
    async fn refund(&self, request: &RefundRequest) -> PaymentResult<RefundReceipt>;
}

/// Errors reported by payment gateways.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// The gateway refused the refund.
    #[error("refund declined: {0}")]
    Declined(String),

    /// The gateway could not be reached or failed internally.
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
}
