use crate::db::with_write_lock;
use crate::error::{Result, StoreError};
use dialdesk_core::domain::{
    AgentId, DialRecord, DialRecordId, DialState, DialingStatus, OrganizationId, PhoneNumber,
};
use dialdesk_core::dto::{ImportReport, RejectedNumber};
use dialdesk_core::rules::attempts_from_stored;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::str::FromStr;
use tracing::debug;

pub(crate) const RECORD_COLUMNS: &str = "id, organization_id, phone_number, assigned_to, uploaded_by, dialing_status, currently_dialing_by, disposition, notes, comments, attempts, priority, last_dialed_at, completed_at, call_log_id, created_at, updated_at";

// Dial queue order: fresh numbers before retries, then priority, then age.
pub(crate) const QUEUE_ORDER: &str = "attempts ASC, priority DESC, created_at ASC, id ASC";

#[derive(Debug, Clone)]
pub struct ImportEntry {
    pub phone_number: String,
    pub priority: i64,
    pub notes: Option<String>,
}

impl ImportEntry {
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            priority: 0,
            notes: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportBatch {
    pub organization_id: OrganizationId,
    pub assigned_to: AgentId,
    pub uploaded_by: Option<String>,
    pub entries: Vec<ImportEntry>,
}

enum ExistingRecord {
    Idle(DialRecordId),
    Leased,
}

pub struct RecordsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> RecordsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Creates or resets one record per number for the batch's tenant and
    /// agent. Records currently under lease are left alone.
    pub fn import(&self, now_utc: i64, batch: ImportBatch) -> Result<ImportReport> {
        let report = with_write_lock(self.conn, |conn| import_inner(conn, now_utc, &batch))?;
        debug!(
            organization = %batch.organization_id,
            agent = %batch.assigned_to,
            created = report.created,
            reset = report.reset,
            skipped_leased = report.skipped_leased,
            rejected = report.rejected.len(),
            "imported dial records"
        );
        Ok(report)
    }

    pub fn get(&self, id: DialRecordId) -> Result<Option<DialRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM dial_records WHERE id = ?1;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(record_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn find_by_phone(
        &self,
        organization_id: &OrganizationId,
        phone_number: &PhoneNumber,
    ) -> Result<Option<DialRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM dial_records
             WHERE organization_id = ?1 AND phone_number = ?2;"
        ))?;
        let mut rows = stmt.query([organization_id.as_str(), phone_number.as_str()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(record_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list_for_agent(
        &self,
        organization_id: &OrganizationId,
        agent_id: &AgentId,
        status: Option<DialingStatus>,
    ) -> Result<Vec<DialRecord>> {
        let mut stmt = match status {
            Some(_) => self.conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM dial_records
                 WHERE organization_id = ?1 AND assigned_to = ?2 AND dialing_status = ?3
                 ORDER BY {QUEUE_ORDER};"
            ))?,
            None => self.conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM dial_records
                 WHERE organization_id = ?1 AND assigned_to = ?2
                 ORDER BY {QUEUE_ORDER};"
            ))?,
        };

        let mut rows = match status {
            Some(status) => stmt.query(params![
                organization_id.as_str(),
                agent_id.as_str(),
                status.as_str()
            ])?,
            None => stmt.query(params![organization_id.as_str(), agent_id.as_str()])?,
        };

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(record_from_row(row)?);
        }
        Ok(records)
    }
}

fn import_inner(conn: &Connection, now_utc: i64, batch: &ImportBatch) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    let mut seen: HashSet<PhoneNumber> = HashSet::new();

    for entry in &batch.entries {
        let phone = match PhoneNumber::parse(&entry.phone_number) {
            Ok(phone) => phone,
            Err(err) => {
                report.rejected.push(RejectedNumber {
                    input: entry.phone_number.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };
        if !seen.insert(phone.clone()) {
            report.duplicates += 1;
            continue;
        }

        match find_existing(conn, &batch.organization_id, &phone)? {
            None => {
                insert_record(conn, now_utc, batch, entry, &phone)?;
                report.created += 1;
            }
            Some(ExistingRecord::Leased) => report.skipped_leased += 1,
            Some(ExistingRecord::Idle(id)) => {
                reset_record(conn, now_utc, batch, entry, id)?;
                report.reset += 1;
            }
        }
    }

    Ok(report)
}

fn find_existing(
    conn: &Connection,
    organization_id: &OrganizationId,
    phone: &PhoneNumber,
) -> Result<Option<ExistingRecord>> {
    let row: Option<(String, Option<String>)> = conn
        .query_row(
            "SELECT id, currently_dialing_by FROM dial_records
             WHERE organization_id = ?1 AND phone_number = ?2;",
            [organization_id.as_str(), phone.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    row.map(|(id, holder)| match holder {
        Some(_) => Ok(ExistingRecord::Leased),
        None => parse_record_id(id).map(ExistingRecord::Idle),
    })
    .transpose()
}

fn insert_record(
    conn: &Connection,
    now_utc: i64,
    batch: &ImportBatch,
    entry: &ImportEntry,
    phone: &PhoneNumber,
) -> Result<()> {
    conn.execute(
        "INSERT INTO dial_records
         (id, organization_id, phone_number, assigned_to, uploaded_by, dialing_status, notes, attempts, priority, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9, ?9);",
        params![
            DialRecordId::new().to_string(),
            batch.organization_id.as_str(),
            phone.as_str(),
            batch.assigned_to.as_str(),
            batch.uploaded_by,
            DialingStatus::Pending.as_str(),
            entry.notes,
            entry.priority,
            now_utc,
        ],
    )?;
    Ok(())
}

fn reset_record(
    conn: &Connection,
    now_utc: i64,
    batch: &ImportBatch,
    entry: &ImportEntry,
    id: DialRecordId,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE dial_records
         SET assigned_to = ?2,
             uploaded_by = COALESCE(?3, uploaded_by),
             notes = COALESCE(?4, notes),
             priority = ?5,
             dialing_status = ?6,
             attempts = 0,
             disposition = NULL,
             last_dialed_at = NULL,
             completed_at = NULL,
             call_log_id = NULL,
             updated_at = ?7
         WHERE id = ?1 AND currently_dialing_by IS NULL;",
        params![
            id.to_string(),
            batch.assigned_to.as_str(),
            batch.uploaded_by,
            entry.notes,
            entry.priority,
            DialingStatus::Pending.as_str(),
            now_utc,
        ],
    )?;
    if updated != 1 {
        return Err(StoreError::NotFound(id.to_string()));
    }
    Ok(())
}

pub(crate) fn redialable_status_list() -> String {
    DialingStatus::REDIALABLE
        .iter()
        .map(|status| format!("'{}'", status.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_record_id(raw: String) -> Result<DialRecordId> {
    DialRecordId::from_str(&raw).map_err(|_| StoreError::InvalidId(raw))
}

pub(crate) fn record_from_row(row: &rusqlite::Row<'_>) -> Result<DialRecord> {
    let id = parse_record_id(row.get(0)?)?;
    let organization_raw: String = row.get(1)?;
    let phone_raw: String = row.get(2)?;
    let assigned_raw: String = row.get(3)?;
    let status_raw: String = row.get(5)?;
    let holder_raw: Option<String> = row.get(6)?;
    let attempts_raw: i64 = row.get(10)?;

    let status = DialingStatus::from_str(&status_raw)?;
    let holder = holder_raw.as_deref().map(AgentId::new).transpose()?;

    Ok(DialRecord {
        id,
        organization_id: OrganizationId::new(&organization_raw)?,
        phone_number: PhoneNumber::parse(&phone_raw)?,
        assigned_to: AgentId::new(&assigned_raw)?,
        uploaded_by: row.get(4)?,
        state: DialState::from_parts(status, holder)?,
        disposition: row.get(7)?,
        notes: row.get(8)?,
        comments: row.get(9)?,
        attempts: attempts_from_stored(attempts_raw)?,
        priority: row.get(11)?,
        last_dialed_at: row.get(12)?,
        completed_at: row.get(13)?,
        call_log_id: row.get(14)?,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

#[cfg(test)]
mod tests {
    use super::redialable_status_list;

    #[test]
    fn redialable_list_excludes_dialing_and_completed() {
        let list = redialable_status_list();
        assert_eq!(list, "'pending', 'failed', 'busy', 'no_answer'");
    }
}
