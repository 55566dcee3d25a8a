//! Query engine: runs one query against the history and bookmark stores.
//!
//! Both sources are fetched concurrently with rayon. Store-side text search is
//! only a pre-filter; the `EntryMatcher` built from the full token list has
//! the final say.

use crate::matcher::EntryMatcher;
use crate::query::{parse_tokens, text_hint};
use crate::search::{dedupe, filter_entries, flatten_bookmarks, DedupeKey, Entry};
use crate::store::{BookmarkStore, StoreError, VisitLog};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::time::Instant;
use thiserror::Error;

/// Upper bound on raw history records fetched per search.
pub const MAX_HISTORY_RESULTS: usize = 20_000;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("search failed: {0}")]
    SearchFailed(#[source] StoreError),
    #[error("{failed} of {attempted} deletions failed, some items may remain")]
    DeletionPartialFailure { attempted: usize, failed: usize },
}

/// Which stores a search should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sources {
    pub history: bool,
    pub bookmarks: bool,
}

impl Default for Sources {
    fn default() -> Self {
        Sources {
            history: true,
            bookmarks: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub history: Vec<Entry>,
    pub bookmarks: Vec<Entry>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.history.is_empty() && self.bookmarks.is_empty()
    }
}

/// Number of items removed by a successful batch delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub history: usize,
    pub bookmarks: usize,
}

pub struct QueryEngine<'a> {
    history: Option<&'a dyn VisitLog>,
    bookmarks: Option<&'a dyn BookmarkStore>,
    max_history_results: usize,
}

impl<'a> QueryEngine<'a> {
    pub fn new(
        history: Option<&'a dyn VisitLog>,
        bookmarks: Option<&'a dyn BookmarkStore>,
    ) -> Self {
        QueryEngine {
            history,
            bookmarks,
            max_history_results: MAX_HISTORY_RESULTS,
        }
    }

    pub fn with_history_cap(mut self, cap: usize) -> Self {
        self.max_history_results = cap;
        self
    }

    /// Run `raw` against the included stores. Either store failing fails the
    /// whole search.
    pub fn search(&self, raw: &str, sources: Sources) -> Result<SearchResults, SweepError> {
        let start = Instant::now();
        let tokens = parse_tokens(raw);
        let matcher = EntryMatcher::new(&tokens);
        let hint = text_hint(&tokens);
        log::trace!("Searching for {:?} ({} tokens)", raw, tokens.len());

        let (history, bookmarks) = rayon::join(
            || match (sources.history, self.history) {
                (true, Some(store)) => self.search_history(store, &hint, &matcher),
                (true, None) => {
                    log::debug!("History requested but no history store is available");
                    Ok(Vec::new())
                }
                (false, _) => Ok(Vec::new()),
            },
            || match (sources.bookmarks, self.bookmarks) {
                (true, Some(store)) => search_bookmarks(store, &hint, &matcher),
                (true, None) => {
                    log::debug!("Bookmarks requested but no bookmark store is available");
                    Ok(Vec::new())
                }
                (false, _) => Ok(Vec::new()),
            },
        );

        let results = SearchResults {
            history: history.map_err(SweepError::SearchFailed)?,
            bookmarks: bookmarks.map_err(SweepError::SearchFailed)?,
        };

        log::debug!(
            "Search matched {} history entries and {} bookmarks in {:?}",
            results.history.len(),
            results.bookmarks.len(),
            start.elapsed()
        );
        Ok(results)
    }

    fn search_history(
        &self,
        store: &dyn VisitLog,
        hint: &str,
        matcher: &EntryMatcher,
    ) -> Result<Vec<Entry>, StoreError> {
        // Unix epoch: everything the store remembers
        let since = DateTime::<Utc>::default();
        let raw: Vec<Entry> = store
            .search(hint, since, self.max_history_results)?
            .into_iter()
            .take(self.max_history_results)
            .map(|visit| Entry::history(&visit.url, visit.title.as_deref().unwrap_or_default()))
            .collect();

        Ok(filter_entries(dedupe(raw, DedupeKey::Url), matcher))
    }

    /// Delete the given history urls and bookmark ids. Every item is attempted;
    /// successful deletions stay deleted even when others fail.
    pub fn delete(
        &self,
        history_urls: &[String],
        bookmark_ids: &[String],
    ) -> Result<DeletionReport, SweepError> {
        let attempted = history_urls.len() + bookmark_ids.len();
        if attempted == 0 {
            return Ok(DeletionReport::default());
        }
        log::trace!(
            "Deleting {} history entries and {} bookmarks",
            history_urls.len(),
            bookmark_ids.len()
        );

        let history_failed = match self.history {
            Some(store) => history_urls
                .par_iter()
                .filter(|url| match store.delete_by_url(url) {
                    Ok(()) => false,
                    Err(e) => {
                        log::error!("Error deleting history for {}: {}", url, e);
                        true
                    }
                })
                .count(),
            None => history_urls.len(),
        };

        let bookmarks_failed = match self.bookmarks {
            Some(store) => bookmark_ids
                .par_iter()
                .filter(|id| match remove_bookmark(store, id) {
                    Ok(()) => false,
                    Err(e) => {
                        log::error!("Error removing bookmark {}: {}", id, e);
                        true
                    }
                })
                .count(),
            None => bookmark_ids.len(),
        };

        let failed = history_failed + bookmarks_failed;
        if failed > 0 {
            return Err(SweepError::DeletionPartialFailure { attempted, failed });
        }

        Ok(DeletionReport {
            history: history_urls.len(),
            bookmarks: bookmark_ids.len(),
        })
    }
}

fn search_bookmarks(
    store: &dyn BookmarkStore,
    hint: &str,
    matcher: &EntryMatcher,
) -> Result<Vec<Entry>, StoreError> {
    let raw = if hint.is_empty() {
        flatten_bookmarks(&store.get_tree()?)
    } else {
        store
            .search_by_text(hint)?
            .iter()
            .filter_map(|node| node.to_entry())
            .collect()
    };

    Ok(filter_entries(dedupe(raw, DedupeKey::Identity), matcher))
}

/// Remove a bookmark, falling back to single removal when the store refuses
/// subtree removal (it does for plain bookmarks).
fn remove_bookmark(store: &dyn BookmarkStore, id: &str) -> Result<(), StoreError> {
    match store.remove_subtree(id) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::debug!("Subtree removal of {} failed ({}), removing single node", id, e);
            store.remove_single(id)
        }
    }
}
