//! Helpers for querying and editing Chromium SQLite databases.
//!
//! - `create_temp_db_copy` to read a locked database through a tempfile copy,
//!   verifying integrity before use.
//! - `open_live` for writes against the real file.
//! - `query_rows` to prepare, execute, and map query results.
//! - WebKit epoch conversion for `last_visit_time` columns.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags, Params, Result as SqliteResult, Row};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

use crate::store::StoreError;

/// Seconds between 1601-01-01 and 1970-01-01.
const WEBKIT_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a temporary copy of an SQLite database for safe reading
pub fn create_temp_db_copy(
    db_path: &Path,
) -> Result<(NamedTempFile, Connection), StoreError> {
    log::trace!("Creating temporary copy of {}", db_path.display());

    let temp_file = NamedTempFile::with_prefix("sweep_db")?;
    let temp_path = temp_file.path().to_path_buf();
    fs::copy(db_path, &temp_path)?;

    let conn = Connection::open_with_flags(&temp_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

    // A copy taken mid-write can be torn; retry once before giving up
    if !integrity_ok(&conn) {
        log::debug!("Temporary copy failed integrity check, copying again");
        drop(conn);
        fs::copy(db_path, &temp_path)?;
        let conn = Connection::open_with_flags(&temp_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        return Ok((temp_file, conn));
    }

    Ok((temp_file, conn))
}

fn integrity_ok(conn: &Connection) -> bool {
    conn.query_row("PRAGMA quick_check", [], |row| row.get::<_, String>(0))
        .map(|result| result == "ok")
        .unwrap_or(false)
}

/// Open the real database for writing.
pub fn open_live(db_path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

/// Execute a query and map every row.
pub fn query_rows<P, F, T>(
    conn: &Connection,
    sql: &str,
    params: P,
    row_mapper: F,
) -> SqliteResult<Vec<T>>
where
    P: Params,
    F: FnMut(&Row<'_>) -> SqliteResult<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let results = stmt
        .query_map(params, row_mapper)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(results)
}

/// Microseconds since 1601-01-01, as stored by Chromium.
pub fn to_webkit_micros(time: DateTime<Utc>) -> i64 {
    time.timestamp_micros() + WEBKIT_EPOCH_OFFSET_SECS * 1_000_000
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` clause.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
