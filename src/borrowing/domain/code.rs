//! One-time handover codes exchanged at pickup and return.

use super::BorrowingDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which end of the rental a handover code secures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeKind {
    /// Code checked when the borrower collects the item.
    Pickup,
    /// Code checked when the item is handed back.
    Return,
}

impl CodeKind {
    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Return => "return",
        }
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Numeric shared secret confirming a physical handover.
///
/// `Debug` output is redacted so codes never reach logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HandoverCode(String);

impl HandoverCode {
    /// Creates a code from a string of ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns [`BorrowingDomainError::MalformedCode`] when the value is
    /// empty or contains anything other than `0-9`.
    pub fn new(value: impl Into<String>) -> Result<Self, BorrowingDomainError> {
        let digits = value.into();
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(BorrowingDomainError::MalformedCode);
        }
        Ok(Self(digits))
    }

    /// Returns the code digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number of digits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; codes are validated non-empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compares a submitted candidate using exact string equality.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl TryFrom<String> for HandoverCode {
    type Error = BorrowingDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HandoverCode> for String {
    fn from(code: HandoverCode) -> Self {
        code.0
    }
}

impl fmt::Debug for HandoverCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HandoverCode(<redacted>)")
    }
}

/// Rules for generating and checking handover codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodePolicy {
    /// Number of digits in a generated code.
    pub length: usize,
    /// Wrong submissions allowed per issued code; `None` means unbounded.
    pub max_attempts: Option<u32>,
}

impl CodePolicy {
    /// Digits in a generated code unless configured otherwise.
    pub const DEFAULT_LENGTH: usize = 7;

    /// Returns the attempts left after `failed` wrong submissions, or `None`
    /// when attempts are unbounded.
    #[must_use]
    pub fn remaining_after(&self, failed: u32) -> Option<u32> {
        self.max_attempts.map(|max| max.saturating_sub(failed))
    }

    /// Returns `true` once `failed` wrong submissions exhaust the limit.
    #[must_use]
    pub fn is_exhausted(&self, failed: u32) -> bool {
        self.max_attempts.is_some_and(|max| failed >= max)
    }
}

impl Default for CodePolicy {
    fn default() -> Self {
        Self {
            length: Self::DEFAULT_LENGTH,
            max_attempts: None,
        }
    }
}
