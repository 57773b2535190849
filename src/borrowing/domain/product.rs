//! Snapshot of the rented item taken at booking time.

use super::{BorrowingDomainError, MinorUnits};
use serde::{Deserialize, Serialize};

/// Immutable copy of the listed product a borrowing refers to.
///
/// Later edits to the listing never change a borrowing already made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    product_id: String,
    title: String,
    daily_rate: MinorUnits,
    location: Option<String>,
}

impl ProductSnapshot {
    /// Creates a snapshot with a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingDomainError::EmptyProductTitle`] when the title is
    /// empty after trimming.
    pub fn new(
        product_id: impl Into<String>,
        title: impl Into<String>,
        daily_rate: MinorUnits,
    ) -> Result<Self, BorrowingDomainError> {
        let raw_title = title.into();
        let trimmed = raw_title.trim();
        if trimmed.is_empty() {
            return Err(BorrowingDomainError::EmptyProductTitle);
        }
        Ok(Self {
            product_id: product_id.into(),
            title: trimmed.to_owned(),
            daily_rate,
            location: None,
        })
    }

    /// Sets the pickup location shown to the borrower.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Returns the listing identifier.
    #[must_use]
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Returns the listing title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the daily rental rate.
    #[must_use]
    pub const fn daily_rate(&self) -> MinorUnits {
        self.daily_rate
    }

    /// Returns the pickup location, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}
