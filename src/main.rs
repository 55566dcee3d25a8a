// src/main.rs
use std::env;
use std::error::Error;
use std::time::Instant;

use browser_sweep::alfred;
use browser_sweep::bookmarks::ChromiumBookmarks;
use browser_sweep::browser::browser_paths;
use browser_sweep::config::SweepConfig;
use browser_sweep::engine::{QueryEngine, Sources};
use browser_sweep::history::ChromiumHistory;
use browser_sweep::search::EntryKind;
use browser_sweep::session::{Phase, Session, Status};
use browser_sweep::settings::{Settings, LAST_QUERY};
use browser_sweep::store::{BookmarkStore, VisitLog};

const USAGE: &str = "usage: browser_sweep preview [query…] | delete <history:url|bookmark:id>… | purge [--yes] [query…]";

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let start = Instant::now();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("preview");
    let rest = args.get(2..).unwrap_or_default();

    let config = SweepConfig::from_env();
    let paths = browser_paths(config.browser, &config.profile);
    let history = paths.history.map(ChromiumHistory::new);
    let bookmarks = paths.bookmarks.map(ChromiumBookmarks::new);
    if let Some(h) = &history {
        log::debug!("Using history at {}", h.path().display());
    }
    if let Some(b) = &bookmarks {
        log::debug!("Using bookmarks at {}", b.path().display());
    }

    let engine = QueryEngine::new(
        history.as_ref().map(|h| h as &dyn VisitLog),
        bookmarks.as_ref().map(|b| b as &dyn BookmarkStore),
    )
    .with_history_cap(config.max_history_results);

    match command {
        "preview" => preview(&engine, config.sources, rest),
        "delete" => delete(&engine, config.sources, rest),
        "purge" => purge(&engine, config.sources, rest),
        other => {
            eprintln!("{}", USAGE);
            return Err(format!("unknown command {:?}", other).into());
        }
    }?;

    log::debug!("{} completed in {:?}", command, start.elapsed());
    Ok(())
}

/// The query typed on the command line, or the remembered one when empty.
/// A typed query is remembered for next time.
fn resolve_query(words: &[String]) -> String {
    let typed = words.join(" ");
    let mut settings = match Settings::open() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Settings unavailable: {}", e);
            return typed;
        }
    };

    if typed.trim().is_empty() {
        return settings.get(LAST_QUERY).unwrap_or_default().to_string();
    }
    if let Err(e) = settings.set(LAST_QUERY, &typed) {
        log::error!("Could not remember query: {}", e);
    }
    typed
}

fn run_search(engine: &QueryEngine, sources: Sources, query: &str) -> Session {
    let (session, ticket) = Session::new().begin_search();
    let outcome = engine.search(query, sources);
    session.finish_search(ticket, outcome)
}

fn delete_selected(engine: &QueryEngine, session: Session) -> Session {
    let history = session.selected(EntryKind::History);
    let bookmarks = session.selected(EntryKind::Bookmark);
    let session = session.begin_deletion();
    let outcome = engine.delete(&history, &bookmarks);
    session.finish_deletion(outcome)
}

fn preview(engine: &QueryEngine, sources: Sources, words: &[String]) -> Result<(), Box<dyn Error>> {
    let query = resolve_query(words);
    let session = run_search(engine, sources, &query);
    alfred::output(&alfred::session_response(&session))
}

/// Delete the given keys. They are checked against the current matches of
/// the remembered query, so only previewed entries can be removed.
fn delete(engine: &QueryEngine, sources: Sources, keys: &[String]) -> Result<(), Box<dyn Error>> {
    let query = resolve_query(&[]);
    let mut session = run_search(engine, sources, &query);
    if session.phase() != Phase::Ready {
        println!("{}", session.status());
        return Err("search failed, nothing deleted".into());
    }

    for key in keys {
        match EntryKind::parse_key(key) {
            Some((kind, identity)) => session = session.set_selected(kind, identity, true),
            None => log::error!("Ignoring malformed key {:?}", key),
        }
    }
    if !session.can_delete() {
        println!("Nothing to delete.");
        return Ok(());
    }

    let session = delete_selected(engine, session);
    println!("{}", session.status());
    match session.status() {
        Status::Deleted => Ok(()),
        _ => Err("some deletions failed".into()),
    }
}

fn purge(engine: &QueryEngine, sources: Sources, args: &[String]) -> Result<(), Box<dyn Error>> {
    let confirmed = args.iter().any(|a| a == "--yes");
    let words: Vec<String> = args.iter().filter(|a| *a != "--yes").cloned().collect();
    let query = resolve_query(&words);

    let session = run_search(engine, sources, &query)
        .select_all(EntryKind::History, true)
        .select_all(EntryKind::Bookmark, true);
    if session.phase() != Phase::Ready || !session.can_delete() {
        println!("{}", session.status());
        return Ok(());
    }

    let results = session.results();
    if !confirmed {
        println!(
            "Would delete {} history entries and {} bookmarks matching {:?}. Re-run with --yes to delete.",
            results.history.len(),
            results.bookmarks.len(),
            query
        );
        return Ok(());
    }

    let session = delete_selected(engine, session);
    println!("{}", session.status());
    match session.status() {
        Status::Deleted => Ok(()),
        _ => Err("some deletions failed".into()),
    }
}
