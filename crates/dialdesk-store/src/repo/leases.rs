use crate::db::with_write_lock;
use crate::error::{Result, StoreError};
use crate::repo::records::{record_from_row, redialable_status_list, QUEUE_ORDER, RECORD_COLUMNS};
use dialdesk_core::domain::{
    AgentId, DialRecord, DialRecordId, DialingStatus, OrganizationId, RetryStatus,
};
use dialdesk_core::rules::AttemptPolicy;
use rusqlite::{params, Connection};
use tracing::{debug, warn};

/// Hands out and takes back exclusive dialing leases.
///
/// Every operation is one conditional `UPDATE ... RETURNING`: the predicate
/// carries the precondition (unleased and under the attempt cap for an
/// acquire, held by the caller for a release), so two callers racing for the
/// same row cannot both match it.
pub struct LeasesRepo<'a> {
    conn: &'a Connection,
    policy: AttemptPolicy,
}

impl<'a> LeasesRepo<'a> {
    pub fn new(conn: &'a Connection, policy: AttemptPolicy) -> Self {
        Self { conn, policy }
    }

    /// Leases the agent's next eligible record, stamping the attempt in the
    /// same statement. `Ok(None)` means the agent's queue is exhausted.
    pub fn lease_next(
        &self,
        now_utc: i64,
        organization_id: &OrganizationId,
        agent_id: &AgentId,
    ) -> Result<Option<DialRecord>> {
        let sql = format!(
            "UPDATE dial_records
             SET dialing_status = ?3,
                 currently_dialing_by = ?2,
                 last_dialed_at = ?4,
                 attempts = attempts + 1,
                 updated_at = ?4
             WHERE id = (
                     SELECT id FROM dial_records
                     WHERE organization_id = ?1
                       AND assigned_to = ?2
                       AND dialing_status IN ({redialable})
                       AND currently_dialing_by IS NULL
                       AND attempts < ?5
                     ORDER BY {QUEUE_ORDER}
                     LIMIT 1
                 )
               AND currently_dialing_by IS NULL
               AND attempts < ?5
             RETURNING {RECORD_COLUMNS};",
            redialable = redialable_status_list(),
        );

        let leased = with_write_lock(self.conn, |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![
                organization_id.as_str(),
                agent_id.as_str(),
                DialingStatus::Dialing.as_str(),
                now_utc,
                self.policy.max_attempts(),
            ])?;
            match rows.next()? {
                Some(row) => Ok(Some(record_from_row(row)?)),
                None => Ok(None),
            }
        })?;

        match &leased {
            Some(record) => debug!(
                record = %record.id,
                agent = %agent_id,
                attempts = record.attempts,
                "lease acquired"
            ),
            None => debug!(
                organization = %organization_id,
                agent = %agent_id,
                "no eligible record"
            ),
        }
        Ok(leased)
    }

    /// Gives the lease back and returns the record to `pending`. The attempt
    /// stamped at acquire time stays counted.
    pub fn release(
        &self,
        now_utc: i64,
        id: DialRecordId,
        agent_id: &AgentId,
    ) -> Result<DialRecord> {
        self.release_to(now_utc, id, agent_id, DialingStatus::Pending)
    }

    /// Gives the lease back after a call that never connected. The record
    /// stays in the pool under `status` until the attempt cap retires it.
    pub fn release_unanswered(
        &self,
        now_utc: i64,
        id: DialRecordId,
        agent_id: &AgentId,
        status: RetryStatus,
    ) -> Result<DialRecord> {
        self.release_to(now_utc, id, agent_id, status.into())
    }

    fn release_to(
        &self,
        now_utc: i64,
        id: DialRecordId,
        agent_id: &AgentId,
        status: DialingStatus,
    ) -> Result<DialRecord> {
        debug_assert!(status.is_redialable());
        let sql = format!(
            "UPDATE dial_records
             SET dialing_status = ?3,
                 currently_dialing_by = NULL,
                 updated_at = ?4
             WHERE id = ?1
               AND currently_dialing_by = ?2
               AND dialing_status = ?5
             RETURNING {RECORD_COLUMNS};"
        );

        let released = with_write_lock(self.conn, |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![
                id.to_string(),
                agent_id.as_str(),
                status.as_str(),
                now_utc,
                DialingStatus::Dialing.as_str(),
            ])?;
            match rows.next()? {
                Some(row) => Ok(Some(record_from_row(row)?)),
                None => Ok(None),
            }
        })?;

        match released {
            Some(record) => {
                debug!(record = %id, agent = %agent_id, status = %status, "lease released");
                Ok(record)
            }
            None => {
                warn!(record = %id, agent = %agent_id, "release rejected: not leased by agent");
                Err(StoreError::NotFoundOrNotOwned(id))
            }
        }
    }
}
