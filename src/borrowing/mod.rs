//! Borrowing lifecycle management for Lendwise.
//!
//! A borrowing is one rental transaction between a borrower and a lender.
//! This module owns its canonical state: validated forward-only transitions,
//! one-time handover codes, deposit settlement through a payment gateway and
//! review unlock. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
