use crate::entities::TaxPayer;
use crate::error::{StoreError, StoreResult, ValidationError};
use crate::validation;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

// ============================================================================
// SCHEMA
// ============================================================================

/// Create tables and seed the metadata row. Safe to run on every start.
pub fn setup_database(conn: &Connection) -> StoreResult<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS TaxPayers (
            Id INTEGER PRIMARY KEY AUTOINCREMENT,
            Title TEXT NOT NULL,
            TaxNumber TEXT NOT NULL UNIQUE
        );

        -- Single-row table: Id is pinned to 1
        CREATE TABLE IF NOT EXISTS DatabaseMetadata (
            Id INTEGER PRIMARY KEY CHECK (Id = 1),
            LastUpdateUtc TEXT
        );

        INSERT INTO DatabaseMetadata (Id, LastUpdateUtc)
        VALUES (1, NULL)
        ON CONFLICT(Id) DO NOTHING;",
    )?;

    Ok(())
}

// ============================================================================
// TAXPAYERS
// ============================================================================

/// Insert, or replace the title of the row holding the same tax number.
pub fn upsert_taxpayer(conn: &Connection, taxpayer: &TaxPayer) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO TaxPayers (Title, TaxNumber) VALUES (?1, ?2)
         ON CONFLICT(TaxNumber) DO UPDATE SET Title = excluded.Title",
        params![taxpayer.title(), taxpayer.tax_number()],
    )?;

    Ok(())
}

/// Returns the number of removed rows (0 or 1).
pub fn delete_taxpayer(conn: &Connection, tax_number: &str) -> StoreResult<usize> {
    let removed = conn.execute(
        "DELETE FROM TaxPayers WHERE TaxNumber = ?1",
        params![tax_number],
    )?;

    Ok(removed)
}

/// All taxpayers in insertion order.
pub fn get_all_taxpayers(conn: &Connection) -> StoreResult<Vec<TaxPayer>> {
    let mut stmt = conn.prepare("SELECT Title, TaxNumber FROM TaxPayers ORDER BY Id")?;

    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(title, tax_number)| row_to_taxpayer(title, tax_number))
        .collect()
}

pub fn get_taxpayer(conn: &Connection, tax_number: &str) -> StoreResult<Option<TaxPayer>> {
    let row = conn
        .query_row(
            "SELECT Title, TaxNumber FROM TaxPayers WHERE TaxNumber = ?1",
            params![tax_number],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;

    row.map(|(title, tax_number)| row_to_taxpayer(title, tax_number))
        .transpose()
}

pub fn verify_count(conn: &Connection) -> StoreResult<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM TaxPayers", [], |row| row.get(0))?;

    Ok(count)
}

/// Stored rows go back through entity validation; a row that fails it means
/// the file was edited outside this program.
///
/// The stored key is checked as is: `TaxPayer::new` would trim it, and the
/// trimmed key would not find the row again.
fn row_to_taxpayer(title: String, tax_number: String) -> StoreResult<TaxPayer> {
    if !validation::is_valid_tax_number(&tax_number) {
        return Err(StoreError::CorruptRow {
            source: ValidationError::InvalidTaxNumber(tax_number.clone()),
            tax_number,
        });
    }

    TaxPayer::new(title, &tax_number).map_err(|source| StoreError::CorruptRow {
        tax_number,
        source,
    })
}

// ============================================================================
// METADATA
// ============================================================================

/// Record `now` as the last successful write.
pub fn write_last_update(conn: &Connection, now: DateTime<Utc>) -> StoreResult<()> {
    conn.execute(
        "UPDATE DatabaseMetadata SET LastUpdateUtc = ?1 WHERE Id = 1",
        params![format_timestamp(now)],
    )?;

    Ok(())
}

/// Last successful write in local time; `None` if the store was never written.
pub fn read_last_update(conn: &Connection) -> StoreResult<Option<DateTime<Local>>> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT LastUpdateUtc FROM DatabaseMetadata WHERE Id = 1",
            [],
            |row| row.get::<_, Option<String>>(0),
        )
        .optional()?
        .flatten();

    match stored.as_deref() {
        // Older files seeded the row with an empty string
        None | Some("") => Ok(None),
        Some(text) => parse_timestamp(text).map(Some),
    }
}

/// RFC 3339 in UTC with a fixed width, so the text sorts chronologically.
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(text: &str) -> StoreResult<DateTime<Local>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|_| StoreError::InvalidTimestamp(text.to_string()))
}
