use crate::domain::{DialRecord, DialState};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Dial attempts a record gets before it is retired from the queue.
pub const MAX_ATTEMPTS: u32 = 3;
/// Upper bound accepted from configuration.
pub const MAX_ATTEMPTS_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    Eligible,
    Leased,
    Completed,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPolicy {
    max_attempts: u32,
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

impl AttemptPolicy {
    pub fn new(max_attempts: u32) -> Result<Self, CoreError> {
        Ok(Self {
            max_attempts: validate_max_attempts(max_attempts)?,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }

    pub fn remaining(&self, attempts: u32) -> u32 {
        self.max_attempts.saturating_sub(attempts)
    }

    /// Read-side mirror of the lease predicate. A record is only ever handed
    /// out by the store; this classifies it for display.
    pub fn eligibility(&self, record: &DialRecord) -> Eligibility {
        match record.state {
            DialState::Dialing { .. } => Eligibility::Leased,
            DialState::Completed => Eligibility::Completed,
            DialState::Pending | DialState::Failed | DialState::Busy | DialState::NoAnswer => {
                if self.is_exhausted(record.attempts) {
                    Eligibility::Exhausted
                } else {
                    Eligibility::Eligible
                }
            }
        }
    }
}

pub fn validate_max_attempts(max_attempts: u32) -> Result<u32, CoreError> {
    if max_attempts == 0 || max_attempts > MAX_ATTEMPTS_LIMIT {
        return Err(CoreError::InvalidMaxAttempts(max_attempts));
    }
    Ok(max_attempts)
}

/// Converts a persisted attempt counter, rejecting values the schema forbids.
pub fn attempts_from_stored(value: i64) -> Result<u32, CoreError> {
    u32::try_from(value).map_err(|_| CoreError::InvalidAttempts(value))
}
