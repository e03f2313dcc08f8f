use crate::db::with_write_lock;
use crate::error::{Result, StoreError};
use crate::repo::records::{record_from_row, RECORD_COLUMNS};
use dialdesk_core::domain::{AgentId, DialRecord, DialRecordId, DialingStatus};
use rusqlite::{params, Connection};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct FinalizeOutcome {
    pub disposition: String,
    /// `None` keeps the stored value.
    pub notes: Option<String>,
    /// `None` keeps the stored value.
    pub comments: Option<String>,
    pub call_log_id: Option<String>,
}

impl FinalizeOutcome {
    pub fn new(disposition: impl Into<String>) -> Self {
        Self {
            disposition: disposition.into(),
            ..Default::default()
        }
    }
}

pub struct OutcomesRepo<'a> {
    conn: &'a Connection,
}

impl<'a> OutcomesRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Records the call outcome and ends the lease. The record is completed
    /// whatever the disposition says; only the lease holder may finalize.
    pub fn finalize(
        &self,
        now_utc: i64,
        id: DialRecordId,
        agent_id: &AgentId,
        outcome: FinalizeOutcome,
    ) -> Result<DialRecord> {
        let sql = format!(
            "UPDATE dial_records
             SET dialing_status = ?3,
                 currently_dialing_by = NULL,
                 disposition = ?4,
                 notes = COALESCE(?5, notes),
                 comments = COALESCE(?6, comments),
                 call_log_id = COALESCE(?7, call_log_id),
                 completed_at = ?8,
                 updated_at = ?8
             WHERE id = ?1
               AND currently_dialing_by = ?2
             RETURNING {RECORD_COLUMNS};"
        );
        let disposition = outcome.disposition.trim().to_string();

        let finalized = with_write_lock(self.conn, |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![
                id.to_string(),
                agent_id.as_str(),
                DialingStatus::Completed.as_str(),
                disposition,
                outcome.notes,
                outcome.comments,
                outcome.call_log_id,
                now_utc,
            ])?;
            match rows.next()? {
                Some(row) => Ok(Some(record_from_row(row)?)),
                None => Ok(None),
            }
        })?;

        match finalized {
            Some(record) => {
                debug!(
                    record = %id,
                    agent = %agent_id,
                    disposition = %disposition,
                    "record finalized"
                );
                Ok(record)
            }
            None => {
                warn!(record = %id, agent = %agent_id, "finalize rejected: not leased by agent");
                Err(StoreError::NotFoundOrNotOwned(id))
            }
        }
    }
}
