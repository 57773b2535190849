//! Tunable settings for the lifecycle service.

use crate::borrowing::domain::CodePolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration for [`super::BorrowingLifecycleService`].
///
/// Every field has a default, so partial JSON documents are accepted.
///
/// # Examples
///
/// ```
/// use lendwise::borrowing::services::LifecycleConfig;
///
/// let config = LifecycleConfig::default();
/// assert_eq!(config.code_length, 7);
/// assert!(config.max_code_attempts.is_none());
///
/// let strict = LifecycleConfig::from_json(r#"{"max_code_attempts": 3}"#)
///     .expect("valid config");
/// assert_eq!(strict.max_code_attempts, Some(3));
/// assert_eq!(strict.code_length, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Digits in generated pickup and return codes.
    pub code_length: usize,
    /// Wrong code submissions allowed per issued code; `None` is unbounded.
    pub max_code_attempts: Option<u32>,
    /// Upper bound for a single payment or review collaborator call.
    pub collaborator_timeout_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            code_length: CodePolicy::DEFAULT_LENGTH,
            max_code_attempts: None,
            collaborator_timeout_ms: 10_000,
        }
    }
}

impl LifecycleConfig {
    /// Creates a configuration that locks a code after three wrong attempts
    /// and gives collaborators five seconds.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            code_length: CodePolicy::DEFAULT_LENGTH,
            max_code_attempts: Some(3),
            collaborator_timeout_ms: 5_000,
        }
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleConfigError::Parse`] for malformed JSON and the
    /// errors of [`Self::validate`] for out-of-range values.
    pub fn from_json(document: &str) -> Result<Self, LifecycleConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the settings can be used.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleConfigError::CodeTooShort`] when codes would have
    /// fewer than [`CodePolicy::DEFAULT_LENGTH`] digits, or
    /// [`LifecycleConfigError::ZeroTimeout`].
    pub const fn validate(&self) -> Result<(), LifecycleConfigError> {
        if self.code_length < CodePolicy::DEFAULT_LENGTH {
            return Err(LifecycleConfigError::CodeTooShort {
                length: self.code_length,
                minimum: CodePolicy::DEFAULT_LENGTH,
            });
        }
        if self.collaborator_timeout_ms == 0 {
            return Err(LifecycleConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Returns the code rules derived from this configuration.
    #[must_use]
    pub const fn code_policy(&self) -> CodePolicy {
        CodePolicy {
            length: self.code_length,
            max_attempts: self.max_code_attempts,
        }
    }

    /// Returns the collaborator timeout as a [`Duration`].
    #[must_use]
    pub const fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }
}

/// Errors raised while loading a [`LifecycleConfig`].
#[derive(Debug, Error)]
pub enum LifecycleConfigError {
    /// The document is not valid configuration JSON.
    #[error("invalid lifecycle configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Generated codes would be shorter than the minimum length.
    #[error("code_length {length} is below the minimum of {minimum} digits")]
    CodeTooShort {
        /// Configured length.
        length: usize,
        /// Shortest accepted length.
        minimum: usize,
    },

    /// Collaborator calls need a non-zero time budget.
    #[error("collaborator_timeout_ms must be at least 1")]
    ZeroTimeout,
}
