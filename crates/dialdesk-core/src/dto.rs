use crate::domain::{DialRecord, DialingStatus};
use crate::rules::{AttemptPolicy, Eligibility};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub dialing: i64,
    pub completed: i64,
    pub failed: i64,
    pub busy: i64,
    pub no_answer: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: DialingStatus, count: i64) {
        let slot = match status {
            DialingStatus::Pending => &mut self.pending,
            DialingStatus::Dialing => &mut self.dialing,
            DialingStatus::Completed => &mut self.completed,
            DialingStatus::Failed => &mut self.failed,
            DialingStatus::Busy => &mut self.busy,
            DialingStatus::NoAnswer => &mut self.no_answer,
        };
        *slot += count;
    }

    pub fn get(&self, status: DialingStatus) -> i64 {
        match status {
            DialingStatus::Pending => self.pending,
            DialingStatus::Dialing => self.dialing,
            DialingStatus::Completed => self.completed,
            DialingStatus::Failed => self.failed,
            DialingStatus::Busy => self.busy,
            DialingStatus::NoAnswer => self.no_answer,
        }
    }

    pub fn total(&self) -> i64 {
        DialingStatus::ALL
            .iter()
            .map(|status| self.get(*status))
            .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub created: usize,
    pub reset: usize,
    pub skipped_leased: usize,
    pub duplicates: usize,
    pub rejected: Vec<RejectedNumber>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedNumber {
    pub input: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDetailDto {
    #[serde(flatten)]
    pub record: DialRecord,
    pub eligibility: Eligibility,
    pub attempts_remaining: u32,
}

impl RecordDetailDto {
    pub fn new(record: DialRecord, policy: &AttemptPolicy) -> Self {
        let eligibility = policy.eligibility(&record);
        let attempts_remaining = policy.remaining(record.attempts);
        Self {
            record,
            eligibility,
            attempts_remaining,
        }
    }
}
