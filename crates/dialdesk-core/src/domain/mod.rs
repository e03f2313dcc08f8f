pub mod ids;
pub mod phone;
pub mod record;
pub mod status;

pub use ids::{AgentId, DialRecordId, OrganizationId};
pub use phone::{normalize_phone_number, PhoneNumber};
pub use record::DialRecord;
pub use status::{DialState, DialingStatus, RetryStatus};
