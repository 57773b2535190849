//! Shared world state for borrowing lifecycle BDD scenarios.

use std::sync::Arc;

use chrono::{Duration, Utc};
use lendwise::borrowing::{
    adapters::memory::{
        InMemoryBorrowingRepository, InMemoryPaymentGateway, InMemoryReviewNotifier,
    },
    domain::{BorrowingId, BorrowingRecord},
    services::{BorrowingLifecycleError, BorrowingLifecycleService, CreateBorrowingRequest},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestBorrowingService =
    BorrowingLifecycleService<InMemoryBorrowingRepository, DefaultClock>;

/// Scenario world for borrowing lifecycle behaviour tests.
pub struct BorrowingWorld {
    pub service: TestBorrowingService,
    pub payments: InMemoryPaymentGateway,
    pub reviews: InMemoryReviewNotifier,
    pub borrowing: Option<BorrowingRecord>,
    pub last_error: Option<BorrowingLifecycleError>,
}

impl BorrowingWorld {
    /// Creates a world backed by in-memory collaborators.
    #[must_use]
    pub fn new() -> Self {
        let payments = InMemoryPaymentGateway::new();
        let reviews = InMemoryReviewNotifier::new();
        let service = BorrowingLifecycleService::new(
            Arc::new(InMemoryBorrowingRepository::new()),
            Arc::new(DefaultClock),
            Arc::new(payments.clone()),
            Arc::new(reviews.clone()),
        );

        Self {
            service,
            payments,
            reviews,
            borrowing: None,
            last_error: None,
        }
    }

    /// Returns the borrowing the scenario is driving.
    pub fn borrowing(&self) -> Result<&BorrowingRecord, eyre::Report> {
        self.borrowing
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing borrowing in scenario world"))
    }

    /// Returns the identifier of the borrowing the scenario is driving.
    pub fn borrowing_id(&self) -> Result<BorrowingId, eyre::Report> {
        self.borrowing().map(BorrowingRecord::id)
    }

    /// Keeps the updated record on success and the error otherwise.
    pub fn record_outcome(&mut self, result: Result<BorrowingRecord, BorrowingLifecycleError>) {
        match result {
            Ok(updated) => {
                self.borrowing = Some(updated);
                self.last_error = None;
            }
            Err(err) => self.last_error = Some(err),
        }
    }
}

impl Default for BorrowingWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BorrowingWorld {
    BorrowingWorld::default()
}

/// Booking of a cordless drill starting tomorrow.
pub fn drill_booking(deposit: u64) -> CreateBorrowingRequest {
    let start = Utc::now() + Duration::days(1);
    CreateBorrowingRequest::new(
        "borrower-7",
        "lender-3",
        "pi_bdd",
        "Cordless drill",
        start,
        start + Duration::days(2),
    )
    .with_listing("drill-42", 1_200)
    .with_amounts(2_400, deposit)
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
