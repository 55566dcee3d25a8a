//! Bookmark store backed by a Chromium `Bookmarks` JSON file.
//!
//! Provides:
//! - `get_tree` converting the `roots` folders into `RawTreeNode`s
//! - `search_by_text` with Chromium's every-word-in-title-or-url semantics
//! - `remove_subtree` / `remove_single` rewriting the file in place
//!
//! Writes go through a tempfile in the same directory and are persisted over
//! the existing file, so a crash never leaves a half-written file behind.

use crate::search::RawTreeNode;
use crate::store::{BookmarkStore, StoreError};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Permanent root folders, in the order Chromium shows them.
const ROOT_KEYS: [&str; 3] = ["bookmark_bar", "other", "synced"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Removal {
    Subtree,
    Single,
}

#[derive(Debug)]
pub struct ChromiumBookmarks {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ChromiumBookmarks {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ChromiumBookmarks {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Value, StoreError> {
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, mut doc: Value) -> Result<(), StoreError> {
        // Chromium recomputes the checksum; a stale one would flag the file as edited
        if let Some(obj) = doc.as_object_mut() {
            obj.remove("checksum");
        }

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &doc)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    fn remove(&self, id: &str, mode: Removal) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut doc = self.load()?;

        let mut outcome = None;
        if let Some(roots) = doc.get_mut("roots") {
            for key in ROOT_KEYS {
                if let Some(Value::Array(children)) =
                    roots.get_mut(key).and_then(|root| root.get_mut("children"))
                {
                    outcome = detach(children, id, mode);
                    if outcome.is_some() {
                        break;
                    }
                }
            }
        }

        match outcome {
            Some(Ok(())) => {
                self.save(doc)?;
                log::debug!("Removed bookmark node {} ({:?})", id, mode);
                Ok(())
            }
            Some(Err(e)) => Err(e),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }
}

/// Remove the node `id` from `children` or any folder below it.
/// `None` when the id does not occur.
fn detach(children: &mut Vec<Value>, id: &str, mode: Removal) -> Option<Result<(), StoreError>> {
    if let Some(pos) = children
        .iter()
        .position(|c| c.get("id").and_then(Value::as_str) == Some(id))
    {
        let node = &children[pos];
        let is_folder = node.get("type").and_then(Value::as_str) == Some("folder");
        let has_children = node
            .get("children")
            .and_then(Value::as_array)
            .map_or(false, |c| !c.is_empty());

        match mode {
            Removal::Subtree if !is_folder => {
                return Some(Err(StoreError::Unsupported(format!(
                    "subtree removal of bookmark {}",
                    id
                ))))
            }
            Removal::Single if has_children => {
                return Some(Err(StoreError::Rejected(format!(
                    "folder {} is not empty",
                    id
                ))))
            }
            _ => {}
        }

        children.remove(pos);
        return Some(Ok(()));
    }

    children.iter_mut().find_map(|child| match child.get_mut("children") {
        Some(Value::Array(grand)) => detach(grand, id, mode),
        _ => None,
    })
}

/// Convert a Chromium JSON node (and its children) into a `RawTreeNode`.
fn to_node(value: &Value) -> Option<RawTreeNode> {
    let obj = value.as_object()?;
    let id = obj.get("id").and_then(Value::as_str)?.to_string();
    let title = obj.get("name").and_then(Value::as_str).map(String::from);

    let url = match obj.get("type").and_then(Value::as_str) {
        Some("url") => obj.get("url").and_then(Value::as_str).map(String::from),
        _ => None,
    };

    let children = obj
        .get("children")
        .and_then(Value::as_array)
        .map(|kids| kids.iter().filter_map(to_node).collect());

    Some(RawTreeNode {
        id,
        url,
        title,
        children,
    })
}

fn node_matches(node: &RawTreeNode, words: &[String]) -> bool {
    let title = node.title.as_deref().unwrap_or_default().to_lowercase();
    let url = node.url.as_deref().unwrap_or_default().to_lowercase();
    words
        .iter()
        .all(|w| title.contains(w.as_str()) || url.contains(w.as_str()))
}

impl BookmarkStore for ChromiumBookmarks {
    fn search_by_text(&self, text: &str) -> Result<Vec<RawTreeNode>, StoreError> {
        let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let roots = self.get_tree()?;
        let mut hits = Vec::new();
        let mut stack: Vec<&RawTreeNode> = roots
            .iter()
            .rev()
            .flat_map(|root| root.children.iter().flatten().rev())
            .collect();

        while let Some(node) = stack.pop() {
            if node_matches(node, &words) {
                hits.push(RawTreeNode {
                    children: None,
                    ..node.clone()
                });
            }
            if let Some(children) = &node.children {
                stack.extend(children.iter().rev());
            }
        }

        log::debug!("Bookmark text search for {:?} found {} nodes", text, hits.len());
        Ok(hits)
    }

    fn get_tree(&self) -> Result<Vec<RawTreeNode>, StoreError> {
        log::trace!("Reading bookmarks from {}", self.path.display());
        let doc = self.load()?;
        let roots = doc
            .get("roots")
            .ok_or_else(|| StoreError::Rejected("bookmarks file has no roots".to_string()))?;

        Ok(ROOT_KEYS
            .iter()
            .filter_map(|key| roots.get(*key))
            .filter_map(to_node)
            .collect())
    }

    fn remove_subtree(&self, id: &str) -> Result<(), StoreError> {
        self.remove(id, Removal::Subtree)
    }

    fn remove_single(&self, id: &str) -> Result<(), StoreError> {
        self.remove(id, Removal::Single)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::flatten_bookmarks;
    use serde_json::json;

    fn bookmarks_file(dir: &Path) -> PathBuf {
        let doc = json!({
            "checksum": "0123456789abcdef",
            "version": 1,
            "roots": {
                "bookmark_bar": {
                    "id": "1", "name": "Bookmarks bar", "type": "folder",
                    "children": [
                        { "id": "10", "name": "Rust", "type": "url", "url": "https://www.rust-lang.org/" },
                        { "id": "11", "name": "Work", "type": "folder", "children": [
                            { "id": "110", "name": "Mail", "type": "url", "url": "https://mail.example.com/" },
                            { "id": "111", "name": "Rust jobs", "type": "url", "url": "https://jobs.example.com/rust" }
                        ]},
                        { "id": "12", "name": "Empty", "type": "folder", "children": [] }
                    ]
                },
                "other": {
                    "id": "2", "name": "Other bookmarks", "type": "folder",
                    "children": [
                        { "id": "20", "name": "Rust again", "type": "url", "url": "https://www.rust-lang.org/" }
                    ]
                },
                "synced": { "id": "3", "name": "Mobile bookmarks", "type": "folder", "children": [] }
            }
        });
        let path = dir.join("Bookmarks");
        fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
        path
    }

    fn sample() -> (tempfile::TempDir, ChromiumBookmarks) {
        let dir = tempfile::tempdir().unwrap();
        let path = bookmarks_file(dir.path());
        (dir, ChromiumBookmarks::new(path))
    }

    fn leaf_ids(store: &ChromiumBookmarks) -> Vec<String> {
        flatten_bookmarks(&store.get_tree().unwrap())
            .into_iter()
            .map(|e| e.identity)
            .collect()
    }

    #[test]
    fn tree_keeps_root_order_and_leaves() {
        let (_dir, store) = sample();
        let roots = store.get_tree().unwrap();
        let root_ids: Vec<&str> = roots.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(root_ids, vec!["1", "2", "3"]);
        assert_eq!(leaf_ids(&store), vec!["10", "110", "111", "20"]);
    }

    #[test]
    fn text_search_needs_every_word() {
        let (_dir, store) = sample();
        let hits = store.search_by_text("RUST jobs").unwrap();
        let ids: Vec<&str> = hits.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["111"]);
    }

    #[test]
    fn text_search_may_return_folders() {
        let (_dir, store) = sample();
        let hits = store.search_by_text("work").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, None);
        assert_eq!(hits[0].children, None);
    }

    #[test]
    fn empty_text_search_finds_nothing() {
        let (_dir, store) = sample();
        assert!(store.search_by_text("  ").unwrap().is_empty());
    }

    #[test]
    fn subtree_removal_drops_folder_content() {
        let (_dir, store) = sample();
        store.remove_subtree("11").unwrap();
        assert_eq!(leaf_ids(&store), vec!["10", "20"]);

        let doc = store.load().unwrap();
        assert!(doc.get("checksum").is_none());
    }

    #[test]
    fn subtree_removal_of_leaf_is_unsupported() {
        let (_dir, store) = sample();
        assert!(matches!(
            store.remove_subtree("110"),
            Err(StoreError::Unsupported(_))
        ));
        store.remove_single("110").unwrap();
        assert_eq!(leaf_ids(&store), vec!["10", "111", "20"]);
    }

    #[test]
    fn single_removal_rejects_full_folder() {
        let (_dir, store) = sample();
        assert!(matches!(store.remove_single("11"), Err(StoreError::Rejected(_))));
        store.remove_single("12").unwrap();
    }

    #[test]
    fn roots_and_unknown_ids_are_not_found() {
        let (_dir, store) = sample();
        assert!(matches!(store.remove_subtree("1"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.remove_single("999"), Err(StoreError::NotFound(_))));
        assert_eq!(leaf_ids(&store).len(), 4);
    }
}
