use crate::domain::ids::AgentId;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Flat status column as persisted and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialingStatus {
    Pending,
    Dialing,
    Completed,
    Failed,
    Busy,
    NoAnswer,
}

impl DialingStatus {
    pub const ALL: [DialingStatus; 6] = [
        DialingStatus::Pending,
        DialingStatus::Dialing,
        DialingStatus::Completed,
        DialingStatus::Failed,
        DialingStatus::Busy,
        DialingStatus::NoAnswer,
    ];

    /// Statuses a record may be leased from.
    pub const REDIALABLE: [DialingStatus; 4] = [
        DialingStatus::Pending,
        DialingStatus::Failed,
        DialingStatus::Busy,
        DialingStatus::NoAnswer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DialingStatus::Pending => "pending",
            DialingStatus::Dialing => "dialing",
            DialingStatus::Completed => "completed",
            DialingStatus::Failed => "failed",
            DialingStatus::Busy => "busy",
            DialingStatus::NoAnswer => "no_answer",
        }
    }

    pub fn is_redialable(&self) -> bool {
        Self::REDIALABLE.contains(self)
    }
}

impl fmt::Display for DialingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialingStatus {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(DialingStatus::Pending),
            "dialing" => Ok(DialingStatus::Dialing),
            "completed" => Ok(DialingStatus::Completed),
            "failed" => Ok(DialingStatus::Failed),
            "busy" => Ok(DialingStatus::Busy),
            "no_answer" | "no-answer" => Ok(DialingStatus::NoAnswer),
            _ => Err(CoreError::InvalidDialingStatus(value.to_string())),
        }
    }
}

/// Outcome of a call that never connected. The record goes back to the pool
/// in this status instead of `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryStatus {
    Failed,
    Busy,
    NoAnswer,
}

impl From<RetryStatus> for DialingStatus {
    fn from(value: RetryStatus) -> Self {
        match value {
            RetryStatus::Failed => DialingStatus::Failed,
            RetryStatus::Busy => DialingStatus::Busy,
            RetryStatus::NoAnswer => DialingStatus::NoAnswer,
        }
    }
}

impl FromStr for RetryStatus {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match DialingStatus::from_str(value)? {
            DialingStatus::Failed => Ok(RetryStatus::Failed),
            DialingStatus::Busy => Ok(RetryStatus::Busy),
            DialingStatus::NoAnswer => Ok(RetryStatus::NoAnswer),
            _ => Err(CoreError::InvalidRetryStatus(value.to_string())),
        }
    }
}

/// Lease state of a record. The lease holder only exists in `Dialing`, so a
/// dialing record without an owner (or an owned record in any other state)
/// cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DialState {
    Pending,
    Failed,
    Busy,
    NoAnswer,
    Dialing { agent: AgentId },
    Completed,
}

impl DialState {
    /// Rebuilds the state from its persisted columns.
    pub fn from_parts(
        status: DialingStatus,
        currently_dialing_by: Option<AgentId>,
    ) -> Result<Self, CoreError> {
        match (status, currently_dialing_by) {
            (DialingStatus::Dialing, Some(agent)) => Ok(DialState::Dialing { agent }),
            (DialingStatus::Dialing, None) => Err(CoreError::LeaseWithoutHolder),
            (_, Some(agent)) => Err(CoreError::HolderWithoutLease(agent.to_string())),
            (DialingStatus::Pending, None) => Ok(DialState::Pending),
            (DialingStatus::Failed, None) => Ok(DialState::Failed),
            (DialingStatus::Busy, None) => Ok(DialState::Busy),
            (DialingStatus::NoAnswer, None) => Ok(DialState::NoAnswer),
            (DialingStatus::Completed, None) => Ok(DialState::Completed),
        }
    }

    pub fn status(&self) -> DialingStatus {
        match self {
            DialState::Pending => DialingStatus::Pending,
            DialState::Failed => DialingStatus::Failed,
            DialState::Busy => DialingStatus::Busy,
            DialState::NoAnswer => DialingStatus::NoAnswer,
            DialState::Dialing { .. } => DialingStatus::Dialing,
            DialState::Completed => DialingStatus::Completed,
        }
    }

    pub fn leased_by(&self) -> Option<&AgentId> {
        match self {
            DialState::Dialing { agent } => Some(agent),
            _ => None,
        }
    }

    pub fn is_leased_by(&self, agent: &AgentId) -> bool {
        self.leased_by() == Some(agent)
    }
}

impl From<RetryStatus> for DialState {
    fn from(value: RetryStatus) -> Self {
        match value {
            RetryStatus::Failed => DialState::Failed,
            RetryStatus::Busy => DialState::Busy,
            RetryStatus::NoAnswer => DialState::NoAnswer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DialState, DialingStatus, RetryStatus};
    use crate::domain::ids::AgentId;
    use crate::error::CoreError;
    use std::str::FromStr;

    #[test]
    fn status_strings_round_trip() {
        for status in DialingStatus::ALL {
            assert_eq!(DialingStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn only_dialing_and_completed_are_not_redialable() {
        let blocked: Vec<_> = DialingStatus::ALL
            .into_iter()
            .filter(|status| !status.is_redialable())
            .collect();
        assert_eq!(blocked, vec![DialingStatus::Dialing, DialingStatus::Completed]);
    }

    #[test]
    fn retry_status_rejects_non_retry_values() {
        assert_eq!(RetryStatus::from_str("busy").unwrap(), RetryStatus::Busy);
        assert_eq!(
            RetryStatus::from_str("completed"),
            Err(CoreError::InvalidRetryStatus("completed".to_string()))
        );
    }

    #[test]
    fn from_parts_enforces_lease_invariant() {
        let agent = AgentId::new("a").unwrap();
        assert_eq!(
            DialState::from_parts(DialingStatus::Dialing, None),
            Err(CoreError::LeaseWithoutHolder)
        );
        assert!(DialState::from_parts(DialingStatus::Pending, Some(agent.clone())).is_err());
        let state = DialState::from_parts(DialingStatus::Dialing, Some(agent.clone())).unwrap();
        assert!(state.is_leased_by(&agent));
        assert_eq!(state.status(), DialingStatus::Dialing);
    }
}
