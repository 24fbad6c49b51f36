// 🗄️ TaxPayer Store - repository over a single SQLite file
//
// Every call opens its own connection and drops it before returning, on
// success and on every error path. Writes run in one transaction together
// with the metadata timestamp, so a failed write leaves nothing behind.

use crate::db;
use crate::entities::TaxPayer;
use crate::error::StoreResult;
use chrono::{DateTime, Local, Utc};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Operations the rest of the application needs from a taxpayer store.
///
/// Not-found is never an error: lookups return `Ok(None)` and deletes
/// return `Ok(false)`.
pub trait TaxPayerRepository {
    /// Every stored taxpayer, in insertion order.
    fn list_all(&self) -> StoreResult<Vec<TaxPayer>>;

    fn get_by_tax_number(&self, tax_number: &str) -> StoreResult<Option<TaxPayer>>;

    /// Insert `taxpayer`, or replace the title of the stored taxpayer with the
    /// same tax number.
    fn upsert(&mut self, taxpayer: &TaxPayer) -> StoreResult<()>;

    /// Remove the taxpayer with `tax_number`; `true` if a row was removed.
    fn delete(&mut self, tax_number: &str) -> StoreResult<bool>;

    /// Time of the last successful write, in local time.
    fn last_update_time(&self) -> Option<DateTime<Local>>;
}

/// SQLite implementation of [`TaxPayerRepository`].
///
/// The last update time is read once in [`SqliteTaxPayerStore::open`] and
/// refreshed in memory after each committed write. A delete that removes
/// nothing does not count as a write.
#[derive(Debug)]
pub struct SqliteTaxPayerStore {
    path: PathBuf,
    last_update: Option<DateTime<Local>>,
}

impl SqliteTaxPayerStore {
    /// Open (or create) the store at `path`.
    ///
    /// Creates the parent directory and the schema when missing. Calling this
    /// on every start is safe.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&path)?;
        db::setup_database(&conn)?;
        let last_update = db::read_last_update(&conn)?;

        info!(path = %path.display(), ?last_update, "taxpayer store opened");

        Ok(SqliteTaxPayerStore { path, last_update })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn count(&self) -> StoreResult<i64> {
        let conn = self.connect()?;
        db::verify_count(&conn)
    }

    /// Upsert every taxpayer in one transaction.
    ///
    /// Either all rows land or none do. The timestamp moves once. An empty
    /// slice is not a write.
    pub fn upsert_many(&mut self, taxpayers: &[TaxPayer]) -> StoreResult<usize> {
        if taxpayers.is_empty() {
            return Ok(0);
        }

        for taxpayer in taxpayers {
            taxpayer.check()?;
        }

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        for taxpayer in taxpayers {
            db::upsert_taxpayer(&tx, taxpayer)?;
        }
        let now = Utc::now();
        db::write_last_update(&tx, now)?;
        tx.commit()?;

        self.last_update = Some(now.with_timezone(&Local));
        info!(count = taxpayers.len(), "taxpayers upserted");

        Ok(taxpayers.len())
    }

    /// Opened per operation; `setup_database` already ran in `open`.
    pub(crate) fn connect(&self) -> StoreResult<Connection> {
        Ok(Connection::open(&self.path)?)
    }
}

impl TaxPayerRepository for SqliteTaxPayerStore {
    fn list_all(&self) -> StoreResult<Vec<TaxPayer>> {
        let conn = self.connect()?;
        let taxpayers = db::get_all_taxpayers(&conn)?;

        debug!(count = taxpayers.len(), "listed taxpayers");
        Ok(taxpayers)
    }

    fn get_by_tax_number(&self, tax_number: &str) -> StoreResult<Option<TaxPayer>> {
        let conn = self.connect()?;
        let found = db::get_taxpayer(&conn, tax_number)?;

        debug!(tax_number, found = found.is_some(), "taxpayer lookup");
        Ok(found)
    }

    fn upsert(&mut self, taxpayer: &TaxPayer) -> StoreResult<()> {
        // Validation comes first so nothing is written for a bad value
        taxpayer.check()?;

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        db::upsert_taxpayer(&tx, taxpayer)?;
        let now = Utc::now();
        db::write_last_update(&tx, now)?;
        tx.commit()?;

        self.last_update = Some(now.with_timezone(&Local));
        info!(tax_number = taxpayer.tax_number(), "taxpayer saved");

        Ok(())
    }

    fn delete(&mut self, tax_number: &str) -> StoreResult<bool> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let removed = db::delete_taxpayer(&tx, tax_number)? > 0;

        if !removed {
            // Dropping the transaction rolls back; nothing changed
            debug!(tax_number, "delete: no such taxpayer");
            return Ok(false);
        }

        let now = Utc::now();
        db::write_last_update(&tx, now)?;
        tx.commit()?;

        self.last_update = Some(now.with_timezone(&Local));
        info!(tax_number, "taxpayer deleted");

        Ok(true)
    }

    fn last_update_time(&self) -> Option<DateTime<Local>> {
        self.last_update
    }
}
