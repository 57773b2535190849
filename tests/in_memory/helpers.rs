//! Shared fixtures for in-memory integration tests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use lendwise::borrowing::{
    adapters::memory::{
        InMemoryBorrowingRepository, InMemoryPaymentGateway, InMemoryReviewNotifier,
    },
    domain::{
        BorrowingRecord, BorrowingTerms, MinorUnits, PartyId, PaymentIntentRef, ProductSnapshot,
        RentalWindow,
    },
    services::{BorrowingLifecycleService, CreateBorrowingRequest, LifecycleConfig},
};
use mockable::DefaultClock;
use rstest::fixture;
use tracing_subscriber::EnvFilter;

/// Service type wired to the in-memory adapters.
pub type TestService = BorrowingLifecycleService<InMemoryBorrowingRepository, DefaultClock>;

/// Service plus handles on its in-memory collaborators.
pub struct Wiring {
    pub service: TestService,
    pub repository: Arc<InMemoryBorrowingRepository>,
    pub payments: InMemoryPaymentGateway,
    pub reviews: InMemoryReviewNotifier,
}

/// Routes service logs to the test harness; set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .is_ok();
}

/// Wires a service with random codes and the given configuration.
pub fn wiring_with(config: LifecycleConfig) -> eyre::Result<Wiring> {
    init_tracing();
    let repository = Arc::new(InMemoryBorrowingRepository::new());
    let payments = InMemoryPaymentGateway::new();
    let reviews = InMemoryReviewNotifier::new();
    let service = BorrowingLifecycleService::new(
        Arc::clone(&repository),
        Arc::new(DefaultClock),
        Arc::new(payments.clone()),
        Arc::new(reviews.clone()),
    )
    .with_config(config)?;
    Ok(Wiring {
        service,
        repository,
        payments,
        reviews,
    })
}

#[fixture]
pub fn wiring() -> Wiring {
    wiring_with(LifecycleConfig::default()).expect("default configuration is valid")
}

#[fixture]
pub fn clock() -> DefaultClock {
    DefaultClock
}

/// Booking request between `borrower` and `lender` starting tomorrow.
pub fn booking(borrower: &str, lender: &str) -> CreateBorrowingRequest {
    let start = Utc::now() + Duration::days(1);
    CreateBorrowingRequest::new(
        borrower,
        lender,
        "pi_integration",
        "Camping tent",
        start,
        start + Duration::days(4),
    )
    .with_listing("tent-7", 900)
    .with_location("Garage")
    .with_amounts(3_600, 2_000)
}

/// Requested record built directly from domain terms.
pub fn requested_record(
    borrower: &str,
    lender: &str,
    clock: &DefaultClock,
) -> eyre::Result<BorrowingRecord> {
    let start = Utc::now() + Duration::days(1);
    let terms = BorrowingTerms {
        borrower_id: PartyId::new(borrower)?,
        lender_id: PartyId::new(lender)?,
        product: ProductSnapshot::new("tent-7", "Camping tent", MinorUnits::new(900))?,
        window: RentalWindow::new(start, start + Duration::days(4))?,
        total: MinorUnits::new(3_600),
        deposit: MinorUnits::new(2_000),
        payment_intent: PaymentIntentRef::new("pi_integration")?,
    };
    Ok(BorrowingRecord::new_request(terms, clock)?)
}
