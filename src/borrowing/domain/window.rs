//! Rental window value object.

use super::BorrowingDomainError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Start and end of a rental, fixed at booking time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl RentalWindow {
    /// Creates a validated rental window.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingDomainError::InvalidRentalWindow`] unless `end` is
    /// strictly after `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, BorrowingDomainError> {
        if end <= start {
            return Err(BorrowingDomainError::InvalidRentalWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the rental start.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the rental end.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns the length of the rental.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns the time left until the rental ends, or `None` once `now` has
    /// reached the end.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        (now < self.end).then(|| self.end - now)
    }

    /// Returns `true` once `now` is past the rental end.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.end
    }
}
