//! Store contracts consumed by the query engine.
//!
//! - `VisitLog`: the browser history
//! - `BookmarkStore`: the bookmark tree
//!
//! Both are `Sync` so the engine can hit them from rayon workers.

use crate::search::RawTreeNode;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed bookmarks file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no such item: {0}")]
    NotFound(String),
    #[error("operation not supported for {0}")]
    Unsupported(String),
    #[error("store rejected the request: {0}")]
    Rejected(String),
}

/// A history record as returned by `VisitLog::search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub url: String,
    pub title: Option<String>,
}

pub trait VisitLog: Sync {
    /// Records visited at or after `since` whose url or title contain every
    /// word of `text` (a superset filter), newest first, at most `max_results`.
    fn search(
        &self,
        text: &str,
        since: DateTime<Utc>,
        max_results: usize,
    ) -> Result<Vec<Visit>, StoreError>;

    fn delete_by_url(&self, url: &str) -> Result<(), StoreError>;
}

pub trait BookmarkStore: Sync {
    /// Nodes (folders included) whose title or url contain every word of `text`.
    fn search_by_text(&self, text: &str) -> Result<Vec<RawTreeNode>, StoreError>;

    fn get_tree(&self) -> Result<Vec<RawTreeNode>, StoreError>;

    /// Remove a folder and everything below it.
    fn remove_subtree(&self, id: &str) -> Result<(), StoreError>;

    /// Remove a single bookmark or an empty folder.
    fn remove_single(&self, id: &str) -> Result<(), StoreError>;
}
