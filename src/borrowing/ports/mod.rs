//! Port contracts for the borrowing lifecycle.
//!
//! Ports define infrastructure-agnostic interfaces used by borrowing
//! services.

pub mod code;
pub mod payment;
pub mod repository;
pub mod review;

pub use code::CodeGenerator;
pub use payment::{PaymentError, PaymentGateway, PaymentResult, RefundReceipt, RefundRequest};
pub use repository::{BorrowingRepository, BorrowingRepositoryError, BorrowingRepositoryResult};
pub use review::{NotificationError, ReviewNotifier};
