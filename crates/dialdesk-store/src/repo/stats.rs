use crate::error::Result;
use dialdesk_core::domain::{AgentId, DialingStatus, OrganizationId};
use dialdesk_core::dto::StatusCounts;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Read-only rollups for dashboards. Each query is a plain snapshot read and
/// may interleave with concurrent lease traffic.
pub struct StatsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> StatsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn by_agent(
        &self,
        organization_id: &OrganizationId,
        agent_id: &AgentId,
    ) -> Result<StatusCounts> {
        let mut stmt = self.conn.prepare(
            "SELECT dialing_status, COUNT(1)
             FROM dial_records
             WHERE organization_id = ?1 AND assigned_to = ?2
             GROUP BY dialing_status;",
        )?;
        let mut rows = stmt.query(params![organization_id.as_str(), agent_id.as_str()])?;
        let mut counts = StatusCounts::default();
        while let Some(row) = rows.next()? {
            let status: String = row.get(0)?;
            counts.add(DialingStatus::from_str(&status)?, row.get(1)?);
        }
        Ok(counts)
    }

    pub fn by_organization(&self, organization_id: &OrganizationId) -> Result<StatusCounts> {
        let mut stmt = self.conn.prepare(
            "SELECT dialing_status, COUNT(1)
             FROM dial_records
             WHERE organization_id = ?1
             GROUP BY dialing_status;",
        )?;
        let mut rows = stmt.query([organization_id.as_str()])?;
        let mut counts = StatusCounts::default();
        while let Some(row) = rows.next()? {
            let status: String = row.get(0)?;
            counts.add(DialingStatus::from_str(&status)?, row.get(1)?);
        }
        Ok(counts)
    }

    pub fn per_agent(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<(AgentId, StatusCounts)>> {
        let mut stmt = self.conn.prepare(
            "SELECT assigned_to, dialing_status, COUNT(1)
             FROM dial_records
             WHERE organization_id = ?1
             GROUP BY assigned_to, dialing_status;",
        )?;
        let mut rows = stmt.query([organization_id.as_str()])?;
        let mut by_agent: BTreeMap<AgentId, StatusCounts> = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let agent: String = row.get(0)?;
            let status: String = row.get(1)?;
            by_agent
                .entry(AgentId::new(&agent)?)
                .or_default()
                .add(DialingStatus::from_str(&status)?, row.get(2)?);
        }
        Ok(by_agent.into_iter().collect())
    }
}
