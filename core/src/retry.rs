//! Attempt accounting for retry-wrapped calls.

use crate::error::ApiError;

/// Attempt counter for one logical call. Starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    max_retries: u32,
}

impl RetryState {
    pub fn new(max_retries: u32) -> Self {
        Self {
            attempt: 1,
            max_retries,
        }
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Fails once the counter has run past `max_retries + 1`, which the
    /// retry loop never allows.
    pub fn check_bound(&self) -> Result<(), ApiError> {
        if self.attempt > self.max_retries.saturating_add(1) {
            return Err(ApiError::RetryInvariant {
                attempt: self.attempt,
                max_retries: self.max_retries,
            });
        }
        Ok(())
    }

    /// Whether a timed-out attempt may be followed by another one.
    pub fn can_retry(&self) -> bool {
        self.attempt < self.max_retries
    }

    pub fn advance(&mut self) {
        self.attempt += 1;
    }
}
