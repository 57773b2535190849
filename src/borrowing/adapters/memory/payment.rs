//! In-memory payment gateway that records refunds.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::borrowing::{
    domain::BorrowingId,
    ports::{PaymentError, PaymentGateway, PaymentResult, RefundReceipt, RefundRequest},
};

/// Payment gateway double that keeps refunds in memory.
///
/// Refunds are idempotent per borrowing: a repeated request returns the
/// original receipt. Failures can be queued with [`Self::fail_next`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<Mutex<GatewayState>>,
}

#[derive(Debug, Default)]
struct GatewayState {
    refunds: HashMap<BorrowingId, (RefundRequest, RefundReceipt)>,
    queued_failures: VecDeque<PaymentError>,
    calls: usize,
}

impl InMemoryPaymentGateway {
    /// Creates a gateway with no recorded refunds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next refund call fail with `error`.
    pub fn fail_next(&self, error: PaymentError) {
        if let Ok(mut state) = self.state.lock() {
            state.queued_failures.push_back(error);
        }
    }

    /// Returns how many times [`PaymentGateway::refund`] was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state.lock().map_or(0, |state| state.calls)
    }

    /// Returns the refund recorded for `borrowing_id`, if any.
    #[must_use]
    pub fn refund_for(&self, borrowing_id: BorrowingId) -> Option<RefundRequest> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.refunds.get(&borrowing_id).map(|(req, _)| req.clone()))
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn refund(&self, request: &RefundRequest) -> PaymentResult<RefundReceipt> {
        let mut state = self
            .state
            .lock()
            .map_err(|err| PaymentError::Unavailable(err.to_string()))?;
        state.calls = state.calls.saturating_add(1);

        if let Some(error) = state.queued_failures.pop_front() {
            return Err(error);
        }
        if let Some((_, receipt)) = state.refunds.get(&request.borrowing_id) {
            return Ok(receipt.clone());
        }

        let receipt = RefundReceipt {
            reference: format!("re_{}", request.idempotency_key()),
        };
        state
            .refunds
            .insert(request.borrowing_id, (request.clone(), receipt.clone()));
        Ok(receipt)
    }
}
