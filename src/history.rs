// src/history.rs
use crate::db::{create_temp_db_copy, escape_like, open_live, query_rows, to_webkit_micros};
use crate::store::{StoreError, Visit, VisitLog};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, TransactionBehavior};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// History store backed by a Chromium `History` database.
#[derive(Debug, Clone)]
pub struct ChromiumHistory {
    db_path: PathBuf,
}

impl ChromiumHistory {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        ChromiumHistory {
            db_path: db_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

/// Build the pre-filter query. Each hint word becomes a `LIKE` clause on url
/// or title. SQLite only folds ASCII case, so non-ASCII words are left to the
/// caller's matcher, and rows holding any non-ASCII character pass every
/// clause: their Unicode lower-casing can produce ASCII (`\u{212A}` is `k`).
fn build_search_sql(text: &str, since: DateTime<Utc>, max_results: usize) -> (String, Vec<Value>) {
    let mut sql = String::from(
        "SELECT url, title FROM urls
         WHERE last_visit_time >= ?",
    );
    let mut params = vec![Value::Integer(to_webkit_micros(since))];

    for word in text.split_whitespace().filter(|w| w.is_ascii()) {
        sql.push_str(
            " AND (url LIKE ? ESCAPE '\\' OR title LIKE ? ESCAPE '\\'
                   OR url GLOB '*[^ -~]*' OR title GLOB '*[^ -~]*')",
        );
        let pattern = format!("%{}%", escape_like(word));
        params.push(Value::Text(pattern.clone()));
        params.push(Value::Text(pattern));
    }

    sql.push_str(" ORDER BY last_visit_time DESC LIMIT ?");
    params.push(Value::Integer(i64::try_from(max_results).unwrap_or(i64::MAX)));

    (sql, params)
}

/// Rows elsewhere in the schema that point at a url or one of its visits,
/// with the tables each statement needs. Statements whose tables are missing
/// are skipped.
const DEPENDENT_ROWS: [(&[&str], &str); 6] = [
    (
        &["visit_source"],
        "DELETE FROM visit_source WHERE id IN
           (SELECT v.id FROM visits v JOIN urls u ON v.url = u.id WHERE u.url = ?1)",
    ),
    (
        &["context_annotations"],
        "DELETE FROM context_annotations WHERE visit_id IN
           (SELECT v.id FROM visits v JOIN urls u ON v.url = u.id WHERE u.url = ?1)",
    ),
    (
        &["content_annotations"],
        "DELETE FROM content_annotations WHERE visit_id IN
           (SELECT v.id FROM visits v JOIN urls u ON v.url = u.id WHERE u.url = ?1)",
    ),
    (
        &["keyword_search_terms"],
        "DELETE FROM keyword_search_terms WHERE url_id IN (SELECT id FROM urls WHERE url = ?1)",
    ),
    (
        &["segment_usage", "segments"],
        "DELETE FROM segment_usage WHERE segment_id IN
           (SELECT s.id FROM segments s JOIN urls u ON s.url_id = u.id WHERE u.url = ?1)",
    ),
    (
        &["segments"],
        "DELETE FROM segments WHERE url_id IN (SELECT id FROM urls WHERE url = ?1)",
    ),
];

fn table_names(conn: &Connection) -> rusqlite::Result<HashSet<String>> {
    Ok(query_rows(
        conn,
        "SELECT name FROM sqlite_master WHERE type = 'table'",
        [],
        |row| row.get(0),
    )?
    .into_iter()
    .collect())
}

impl VisitLog for ChromiumHistory {
    fn search(
        &self,
        text: &str,
        since: DateTime<Utc>,
        max_results: usize,
    ) -> Result<Vec<Visit>, StoreError> {
        log::trace!("Searching history at {}", self.db_path.display());
        // Copy the locked db for easy access
        let (_temp_file, conn) = create_temp_db_copy(&self.db_path)?;

        let (sql, params) = build_search_sql(text, since, max_results);
        let visits = query_rows(&conn, &sql, params_from_iter(params), |row| {
            Ok(Visit {
                url: row.get(0)?,
                title: row.get(1)?,
            })
        })?;

        log::debug!("History pre-filter returned {} rows", visits.len());
        Ok(visits)
    }

    fn delete_by_url(&self, url: &str) -> Result<(), StoreError> {
        let mut conn = open_live(&self.db_path)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let tables = table_names(&tx)?;
        for (needs, sql) in DEPENDENT_ROWS {
            if needs.iter().all(|t| tables.contains(*t)) {
                let n = tx.execute(sql, [url])?;
                log::trace!("Removed {} dependent rows for {}", n, url);
            }
        }

        tx.execute(
            "DELETE FROM visits WHERE url IN (SELECT id FROM urls WHERE url = ?1)",
            [url],
        )?;
        let removed = tx.execute("DELETE FROM urls WHERE url = ?1", [url])?;

        if removed == 0 {
            return Err(StoreError::NotFound(url.to_string()));
        }

        tx.commit()?;
        log::debug!("Deleted history for {}", url);
        Ok(())
    }
}
