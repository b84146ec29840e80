pub mod backup;
pub mod db;
pub mod error;
pub mod migrate;
pub mod paths;
pub mod repo;
pub(crate) mod temp_table;

use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

/// One open database handle plus the repositories that read and write it.
///
/// A `Store` lives for the length of a command or a server process;
/// repositories borrow the connection per call.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: db::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: db::open_in_memory()?,
        })
    }

    pub fn contacts(&self) -> repo::ContactsRepo<'_> {
        repo::ContactsRepo::new(&self.conn)
    }

    pub fn locations(&self) -> repo::LocationsRepo<'_> {
        repo::LocationsRepo::new(&self.conn)
    }

    pub fn labels(&self) -> repo::LabelsRepo<'_> {
        repo::LabelsRepo::new(&self.conn)
    }

    pub fn migrate(&self) -> Result<()> {
        migrate::run_migrations(&self.conn)
    }

    pub fn schema_version(&self) -> Result<i64> {
        migrate::schema_version(&self.conn)
    }

    pub fn backup_to(&self, path: &Path) -> Result<()> {
        backup::backup_to(&self.conn, path)
    }

    /// Raw connection, for SQL the repositories do not cover.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
