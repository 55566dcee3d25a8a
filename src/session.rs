//! Preview session state.
//!
//! A `Session` is an immutable value: every transition consumes the current
//! session and returns the next one. Each search is stamped with a
//! generation number, and only the outcome of the most recent search is
//! applied, so a slow search can never overwrite a newer one.

use crate::engine::{DeletionReport, SearchResults, SweepError};
use crate::search::{Entry, EntryKind};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Searching,
    Ready,
    Failed,
}

/// User-facing status line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Searching,
    NoMatches,
    PreviewReady,
    SearchFailed,
    Deleting,
    Deleted,
    DeletionFailed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Status::Idle => "",
            Status::Searching => "Searching…",
            Status::NoMatches => "No matches.",
            Status::PreviewReady => "Preview ready. Select items to delete.",
            Status::SearchFailed => "Error while searching.",
            Status::Deleting => "Deleting…",
            Status::Deleted => "Done. Items deleted.",
            Status::DeletionFailed => "Error while deleting. Some items may remain.",
        };
        f.write_str(msg)
    }
}

/// Handed out by `begin_search`, handed back to `finish_search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    generation: u64,
    phase: Phase,
    status: Status,
    results: SearchResults,
    selected_history: BTreeSet<String>,
    selected_bookmarks: BTreeSet<String>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn results(&self) -> &SearchResults {
        &self.results
    }

    pub fn entries(&self, kind: EntryKind) -> &[Entry] {
        match kind {
            EntryKind::History => &self.results.history,
            EntryKind::Bookmark => &self.results.bookmarks,
        }
    }

    fn selection(&self, kind: EntryKind) -> &BTreeSet<String> {
        match kind {
            EntryKind::History => &self.selected_history,
            EntryKind::Bookmark => &self.selected_bookmarks,
        }
    }

    fn selection_mut(&mut self, kind: EntryKind) -> &mut BTreeSet<String> {
        match kind {
            EntryKind::History => &mut self.selected_history,
            EntryKind::Bookmark => &mut self.selected_bookmarks,
        }
    }

    /// Selected identities of `kind`, in list order.
    pub fn selected(&self, kind: EntryKind) -> Vec<String> {
        let selection = self.selection(kind);
        self.entries(kind)
            .iter()
            .filter(|e| selection.contains(&e.identity))
            .map(|e| e.identity.clone())
            .collect()
    }

    pub fn can_delete(&self) -> bool {
        !(self.selected_history.is_empty() && self.selected_bookmarks.is_empty())
    }

    fn clear_selection(&mut self) {
        self.selected_history.clear();
        self.selected_bookmarks.clear();
    }

    /// Start a new search. Any previous selection is dropped.
    #[must_use]
    pub fn begin_search(mut self) -> (Session, SearchTicket) {
        self.generation += 1;
        self.phase = Phase::Searching;
        self.status = Status::Searching;
        self.clear_selection();
        let ticket = SearchTicket {
            generation: self.generation,
        };
        (self, ticket)
    }

    /// Apply a search outcome. Outcomes of superseded searches are ignored;
    /// a failure keeps the previous results on display.
    #[must_use]
    pub fn finish_search(
        mut self,
        ticket: SearchTicket,
        outcome: Result<SearchResults, SweepError>,
    ) -> Session {
        if ticket.generation != self.generation {
            log::debug!(
                "Discarding stale search result (generation {}, current {})",
                ticket.generation,
                self.generation
            );
            return self;
        }

        match outcome {
            Ok(results) => {
                self.status = if results.is_empty() {
                    Status::NoMatches
                } else {
                    Status::PreviewReady
                };
                self.phase = Phase::Ready;
                self.results = results;
                self.clear_selection();
            }
            Err(e) => {
                log::error!("Search failed: {}", e);
                self.phase = Phase::Failed;
                self.status = Status::SearchFailed;
            }
        }
        self
    }

    /// Select or deselect one entry. Unknown identities are ignored.
    #[must_use]
    pub fn set_selected(mut self, kind: EntryKind, identity: &str, selected: bool) -> Session {
        if !self.entries(kind).iter().any(|e| e.identity == identity) {
            log::debug!("Ignoring selection of unknown {:?} {}", kind, identity);
            return self;
        }
        let selection = self.selection_mut(kind);
        if selected {
            selection.insert(identity.to_string());
        } else {
            selection.remove(identity);
        }
        self
    }

    /// Select every listed entry of `kind`, or clear them all.
    #[must_use]
    pub fn select_all(mut self, kind: EntryKind, selected: bool) -> Session {
        let identities: BTreeSet<String> = if selected {
            self.entries(kind).iter().map(|e| e.identity.clone()).collect()
        } else {
            BTreeSet::new()
        };
        *self.selection_mut(kind) = identities;
        self
    }

    #[must_use]
    pub fn begin_deletion(mut self) -> Session {
        self.status = Status::Deleting;
        self
    }

    /// Apply a batch deletion outcome. On success the selected entries leave
    /// the lists; on failure nothing changes except the status.
    #[must_use]
    pub fn finish_deletion(mut self, outcome: Result<DeletionReport, SweepError>) -> Session {
        match outcome {
            Ok(report) => {
                log::debug!(
                    "Deleted {} history entries and {} bookmarks",
                    report.history,
                    report.bookmarks
                );
                let history = std::mem::take(&mut self.selected_history);
                let bookmarks = std::mem::take(&mut self.selected_bookmarks);
                self.results.history.retain(|e| !history.contains(&e.identity));
                self.results.bookmarks.retain(|e| !bookmarks.contains(&e.identity));
                self.status = Status::Deleted;
            }
            Err(e) => {
                log::error!("Deletion failed: {}", e);
                self.status = Status::DeletionFailed;
            }
        }
        self
    }
}
