use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("agent id is required")]
    EmptyAgentId,
    #[error("organization id is required")]
    EmptyOrganizationId,
    #[error("phone number is required")]
    EmptyPhoneNumber,
    #[error("invalid phone number: {0}")]
    InvalidPhoneNumber(String),
    #[error("invalid dialing status: {0}")]
    InvalidDialingStatus(String),
    #[error("invalid retry status (expected failed, busy or no_answer): {0}")]
    InvalidRetryStatus(String),
    #[error("invalid max attempts: {0}")]
    InvalidMaxAttempts(u32),
    #[error("invalid attempt count: {0}")]
    InvalidAttempts(i64),
    #[error("record is dialing without a lease holder")]
    LeaseWithoutHolder,
    #[error("record is held by {0} but not dialing")]
    HolderWithoutLease(String),
}
