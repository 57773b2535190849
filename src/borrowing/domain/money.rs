//! Monetary amounts in integer minor currency units.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount expressed in minor currency units (for example cents).
///
/// Amounts are fixed when a borrowing is created and only ever passed on to
/// the payment gateway, so no arithmetic is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(u64);

impl MinorUnits {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from a raw minor-unit value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw minor-unit value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns `true` when the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
