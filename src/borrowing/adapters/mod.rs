//! Adapter implementations for borrowing ports.

pub mod memory;
pub mod postgres;
pub mod random;
