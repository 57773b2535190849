//! In-memory adapters for the borrowing lifecycle.
//!
//! These back the test suites and embedders that do not need durable
//! storage or a real payment gateway.

mod payment;
mod repository;
mod review;

pub use payment::InMemoryPaymentGateway;
pub use repository::InMemoryBorrowingRepository;
pub use review::InMemoryReviewNotifier;
