pub mod db;
pub mod error;
pub mod migrate;
pub mod paths;
pub mod repo;

use crate::db::StoreOptions;
use crate::error::Result;
use dialdesk_core::rules::AttemptPolicy;
use rusqlite::Connection;
use std::path::Path;

/// One connection to the record store. Open one per concurrent handler; the
/// lease protocol relies on SQLite's write lock, not on sharing this value.
pub struct Store {
    conn: Connection,
    policy: AttemptPolicy,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_options(path, &StoreOptions::default())
    }

    pub fn open_with_options(path: &Path, options: &StoreOptions) -> Result<Self> {
        let conn = db::open(path, options)?;
        Ok(Self {
            conn,
            policy: AttemptPolicy::default(),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        Ok(Self {
            conn,
            policy: AttemptPolicy::default(),
        })
    }

    pub fn with_attempt_policy(mut self, policy: AttemptPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn attempt_policy(&self) -> AttemptPolicy {
        self.policy
    }

    pub fn migrate(&self) -> Result<()> {
        migrate::run_migrations(&self.conn)
    }

    pub fn schema_version(&self) -> Result<i64> {
        migrate::schema_version(&self.conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn records(&self) -> repo::RecordsRepo<'_> {
        repo::RecordsRepo::new(&self.conn)
    }

    pub fn leases(&self) -> repo::LeasesRepo<'_> {
        repo::LeasesRepo::new(&self.conn, self.policy)
    }

    pub fn outcomes(&self) -> repo::OutcomesRepo<'_> {
        repo::OutcomesRepo::new(&self.conn)
    }

    pub fn stats(&self) -> repo::StatsRepo<'_> {
        repo::StatsRepo::new(&self.conn)
    }
}
