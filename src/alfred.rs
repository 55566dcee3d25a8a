// src/alfred.rs
use crate::search::{Entry, EntryKind};
use crate::session::Session;
use serde::Serialize;
use std::error::Error;

/// Represents an Alfred Script Filter item
#[derive(Serialize, Debug)]
pub struct AlfredItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mods: Option<Mods>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Text>,
}

#[derive(Serialize, Debug)]
pub struct Mods {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<ModifierAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<ModifierAction>,
}

#[derive(Serialize, Debug)]
pub struct ModifierAction {
    pub valid: bool,
    pub arg: String,
    pub subtitle: String,
}

#[derive(Serialize, Debug)]
pub struct Text {
    pub copy: String,
    pub largetype: String,
}

#[derive(Serialize, Debug)]
pub struct AlfredResponse {
    pub items: Vec<AlfredItem>,
}

impl AlfredItem {
    /// Non-actionable row carrying a status message.
    pub fn status(message: &str, subtitle: Option<String>) -> Self {
        AlfredItem {
            uid: None,
            title: message.to_string(),
            subtitle,
            arg: None,
            valid: Some(false),
            mods: None,
            text: None,
        }
    }

    pub fn entry(kind: EntryKind, entry: &Entry) -> Self {
        let title = if entry.title.is_empty() {
            match kind {
                EntryKind::History => "(no title)".to_string(),
                EntryKind::Bookmark => "(bookmark)".to_string(),
            }
        } else {
            entry.title.clone()
        };
        let key = kind.key(&entry.identity);

        AlfredItem {
            uid: Some(key.clone()),
            title,
            subtitle: Some(entry.url.clone()),
            arg: Some(key),
            valid: Some(true),
            mods: Some(Mods {
                alt: Some(ModifierAction {
                    valid: true,
                    arg: entry.url.clone(),
                    subtitle: "Open in browser".to_string(),
                }),
                cmd: Some(ModifierAction {
                    valid: true,
                    arg: entry.url.clone(),
                    subtitle: format!("Copy {}", entry.url),
                }),
            }),
            text: Some(Text {
                copy: entry.url.clone(),
                largetype: entry.url.clone(),
            }),
        }
    }
}

/// Build the Script Filter response for a session: every match, or a single
/// status row when there is nothing to show.
pub fn session_response(session: &Session) -> AlfredResponse {
    let mut items: Vec<AlfredItem> = [EntryKind::History, EntryKind::Bookmark]
        .into_iter()
        .flat_map(|kind| {
            session
                .entries(kind)
                .iter()
                .map(move |entry| AlfredItem::entry(kind, entry))
        })
        .collect();

    if items.is_empty() {
        items.push(AlfredItem::status(&session.status().to_string(), None));
    } else {
        let results = session.results();
        let summary = format!(
            "{} history entries, {} bookmarks",
            results.history.len(),
            results.bookmarks.len()
        );
        items.insert(0, AlfredItem::status(&session.status().to_string(), Some(summary)));
    }

    AlfredResponse { items }
}

/// Output a response to Alfred
pub fn output(response: &AlfredResponse) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string(response)?);
    Ok(())
}
