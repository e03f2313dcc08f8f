use crate::domain::ids::{AgentId, DialRecordId, OrganizationId};
use crate::domain::phone::PhoneNumber;
use crate::domain::status::{DialState, DialingStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialRecord {
    pub id: DialRecordId,
    pub organization_id: OrganizationId,
    pub phone_number: PhoneNumber,
    pub assigned_to: AgentId,
    pub uploaded_by: Option<String>,
    pub state: DialState,
    pub disposition: Option<String>,
    pub notes: Option<String>,
    pub comments: Option<String>,
    pub attempts: u32,
    pub priority: i64,
    pub last_dialed_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub call_log_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DialRecord {
    pub fn status(&self) -> DialingStatus {
        self.state.status()
    }

    pub fn currently_dialing_by(&self) -> Option<&AgentId> {
        self.state.leased_by()
    }
}
