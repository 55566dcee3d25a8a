//! Core entry types and collection normalisation.
//!
//! Defines:
//! - `Entry`, the flat snapshot every store result is reduced to
//! - `RawTreeNode`, the bookmark tree shape handed out by bookmark stores
//! - `dedupe` to drop repeated identities (first one wins)
//! - `flatten_bookmarks` to turn a bookmark tree into leaf entries
//! - `filter_entries` to apply an `EntryMatcher`

use crate::matcher::EntryMatcher;
use std::collections::HashSet;

/// A matchable record. `identity` is the url for history entries and the
/// node id for bookmarks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub identity: String,
    pub url: String,
    pub title: String,
}

impl Entry {
    pub fn history(url: &str, title: &str) -> Self {
        Entry {
            identity: url.to_string(),
            url: url.to_string(),
            title: title.to_string(),
        }
    }

    pub fn bookmark(id: &str, url: &str, title: &str) -> Self {
        Entry {
            identity: id.to_string(),
            url: url.to_string(),
            title: title.to_string(),
        }
    }
}

/// Which of the two stores an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    History,
    Bookmark,
}

impl EntryKind {
    fn prefix(&self) -> &'static str {
        match self {
            EntryKind::History => "history",
            EntryKind::Bookmark => "bookmark",
        }
    }

    /// Selection key for an entry, e.g. `bookmark:42`.
    pub fn key(&self, identity: &str) -> String {
        format!("{}:{}", self.prefix(), identity)
    }

    /// Split a selection key back into kind and identity.
    pub fn parse_key(key: &str) -> Option<(EntryKind, &str)> {
        let (prefix, identity) = key.split_once(':')?;
        let kind = match prefix {
            "history" => EntryKind::History,
            "bookmark" => EntryKind::Bookmark,
            _ => return None,
        };
        Some((kind, identity)).filter(|(_, id)| !id.is_empty())
    }
}

/// Which field `dedupe` compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeKey {
    Identity,
    Url,
}

impl DedupeKey {
    fn of<'a>(&self, entry: &'a Entry) -> &'a str {
        match self {
            DedupeKey::Identity => &entry.identity,
            DedupeKey::Url => &entry.url,
        }
    }
}

/// Bookmark tree node as produced by a bookmark store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTreeNode {
    pub id: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub children: Option<Vec<RawTreeNode>>,
}

impl RawTreeNode {
    #[cfg(test)]
    pub fn leaf(id: &str, title: &str, url: &str) -> Self {
        RawTreeNode {
            id: id.to_string(),
            url: Some(url.to_string()),
            title: Some(title.to_string()),
            children: None,
        }
    }

    #[cfg(test)]
    pub fn folder(id: &str, title: &str, children: Vec<RawTreeNode>) -> Self {
        RawTreeNode {
            id: id.to_string(),
            url: None,
            title: Some(title.to_string()),
            children: Some(children),
        }
    }

    /// The entry for this node, if it carries a url.
    pub fn to_entry(&self) -> Option<Entry> {
        self.url.as_ref().map(|url| {
            Entry::bookmark(&self.id, url, self.title.as_deref().unwrap_or_default())
        })
    }
}

/// Drop every entry whose key was already seen, keeping first-seen order.
pub fn dedupe(entries: Vec<Entry>, key: DedupeKey) -> Vec<Entry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(key.of(entry).to_string()))
        .collect()
}

/// Flatten a bookmark tree into its url-bearing nodes, in pre-order.
///
/// Children are visited even for nodes that carry a url. A node id seen twice
/// is skipped along with its subtree, so malformed input cannot loop.
pub fn flatten_bookmarks(nodes: &[RawTreeNode]) -> Vec<Entry> {
    let mut out = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&RawTreeNode> = nodes.iter().rev().collect();

    while let Some(node) = stack.pop() {
        if !visited.insert(node.id.as_str()) {
            log::debug!("Bookmark node {} visited twice, skipping", node.id);
            continue;
        }

        if let Some(entry) = node.to_entry() {
            out.push(entry);
        }

        if let Some(children) = &node.children {
            stack.extend(children.iter().rev());
        }
    }

    out
}

/// Keep the entries accepted by `matcher`.
pub fn filter_entries(entries: Vec<Entry>, matcher: &EntryMatcher) -> Vec<Entry> {
    entries
        .into_iter()
        .filter(|entry| matcher.matches(&entry.title, &entry.url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse_tokens;

    fn urls(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.url.as_str()).collect()
    }

    #[test]
    fn keys_keep_colons_in_urls() {
        let key = EntryKind::History.key("https://x.test:8080/");
        assert_eq!(key, "history:https://x.test:8080/");
        assert_eq!(
            EntryKind::parse_key(&key),
            Some((EntryKind::History, "https://x.test:8080/"))
        );
        assert_eq!(EntryKind::parse_key("bookmark:"), None);
        assert_eq!(EntryKind::parse_key("tab:3"), None);
    }

    #[test]
    fn dedupe_keeps_first_seen() {
        let entries = vec![
            Entry::history("a", "first"),
            Entry::history("b", ""),
            Entry::history("a", "second"),
        ];
        let unique = dedupe(entries, DedupeKey::Url);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0], Entry::history("a", "first"));
        assert_eq!(unique[1], Entry::history("b", ""));
    }

    #[test]
    fn dedupe_by_identity_keeps_shared_urls() {
        let entries = vec![
            Entry::bookmark("1", "https://x.test/", "one"),
            Entry::bookmark("2", "https://x.test/", "two"),
            Entry::bookmark("1", "https://x.test/", "one again"),
        ];
        let unique = dedupe(entries, DedupeKey::Identity);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[1].identity, "2");
    }

    fn sample_tree() -> Vec<RawTreeNode> {
        vec![RawTreeNode::folder(
            "0",
            "",
            vec![
                RawTreeNode::folder(
                    "1",
                    "Bookmarks bar",
                    vec![
                        RawTreeNode::leaf("10", "Rust", "https://rust-lang.org/"),
                        RawTreeNode::leaf("11", "Crates", "https://crates.io/"),
                    ],
                ),
                RawTreeNode::folder(
                    "2",
                    "Other",
                    vec![RawTreeNode::leaf("20", "Docs", "https://docs.rs/")],
                ),
            ],
        )]
    }

    #[test]
    fn flatten_yields_leaves_in_preorder() {
        let entries = flatten_bookmarks(&sample_tree());
        let ids: Vec<&str> = entries.iter().map(|e| e.identity.as_str()).collect();
        assert_eq!(ids, vec!["10", "11", "20"]);
        assert_eq!(
            urls(&entries),
            vec!["https://rust-lang.org/", "https://crates.io/", "https://docs.rs/"]
        );
    }

    #[test]
    fn flatten_defaults_missing_title() {
        let tree = vec![RawTreeNode {
            id: "5".into(),
            url: Some("https://x.test/".into()),
            title: None,
            children: None,
        }];
        assert_eq!(
            flatten_bookmarks(&tree),
            vec![Entry::bookmark("5", "https://x.test/", "")]
        );
    }

    #[test]
    fn flatten_visits_children_of_url_nodes() {
        let mut odd = RawTreeNode::leaf("1", "parent", "https://parent.test/");
        odd.children = Some(vec![RawTreeNode::leaf("2", "child", "https://child.test/")]);
        let entries = flatten_bookmarks(&[odd]);
        assert_eq!(urls(&entries), vec!["https://parent.test/", "https://child.test/"]);
    }

    #[test]
    fn flatten_skips_repeated_ids() {
        let dup = RawTreeNode::folder(
            "9",
            "dup",
            vec![RawTreeNode::leaf("91", "inner", "https://inner.test/")],
        );
        let tree = vec![dup.clone(), dup];
        assert_eq!(flatten_bookmarks(&tree).len(), 1);
    }

    #[test]
    fn flatten_handles_deep_trees() {
        let mut node = RawTreeNode::leaf("leaf", "deep", "https://deep.test/");
        for depth in 0..100_000 {
            node = RawTreeNode::folder(&depth.to_string(), "", vec![node]);
        }
        let entries = flatten_bookmarks(std::slice::from_ref(&node));
        assert_eq!(entries.len(), 1);
        // dropping a 100k-deep tree recurses; leak it instead
        std::mem::forget(node);
    }

    #[test]
    fn filter_applies_matcher() {
        let entries = flatten_bookmarks(&sample_tree());
        let matcher = EntryMatcher::new(&parse_tokens("host:*.rs"));
        let kept = filter_entries(entries, &matcher);
        assert_eq!(urls(&kept), vec!["https://docs.rs/"]);
    }
}
