//! Lendwise: peer-to-peer item borrowing.
//!
//! This crate tracks a borrowing from the borrower's request, through
//! code-verified pickup and return handovers, to the lender's condition check,
//! deposit refund and review unlock.
//!
//! # Architecture
//!
//! Lendwise follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, payments, etc.)
//!
//! # Modules
//!
//! - [`borrowing`]: Borrowing lifecycle, handover codes and settlement

pub mod borrowing;
