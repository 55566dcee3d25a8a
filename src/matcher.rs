//! Entry matching.
//!
//! An entry matches a token list when
//! - every text token appears in its title or its url (case-insensitive), and
//! - every host token matches its hostname, either as a substring or, when the
//!   pattern contains `*`, as an anchored glob.

use crate::query::{Token, TokenKind};
use crate::utils::get_domain;
use regex::Regex;

/// A host constraint compiled once per search.
#[derive(Debug, Clone)]
pub enum HostPattern {
    Substring(String),
    Glob(Regex),
    /// A glob that could not be compiled; never matches.
    Invalid,
}

impl HostPattern {
    pub fn new(pattern: &str) -> Self {
        if !pattern.contains('*') {
            return HostPattern::Substring(pattern.to_string());
        }

        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        match Regex::new(&format!("(?i)^{}$", body)) {
            Ok(re) => HostPattern::Glob(re),
            Err(e) => {
                log::debug!("Host pattern {:?} rejected: {}", pattern, e);
                HostPattern::Invalid
            }
        }
    }

    pub fn matches(&self, host: &str) -> bool {
        match self {
            HostPattern::Substring(needle) => host.contains(needle.as_str()),
            HostPattern::Glob(re) => re.is_match(host),
            HostPattern::Invalid => false,
        }
    }
}

/// Test a lower-cased hostname against a single host pattern.
pub fn host_matches(host: &str, pattern: &str) -> bool {
    HostPattern::new(pattern).matches(host)
}

/// Token list split into its text and host groups, ready to test many entries.
#[derive(Debug, Clone, Default)]
pub struct EntryMatcher {
    text: Vec<String>,
    hosts: Vec<HostPattern>,
}

impl EntryMatcher {
    pub fn new(tokens: &[Token]) -> Self {
        let mut matcher = EntryMatcher::default();
        for token in tokens {
            match token.kind {
                TokenKind::Text => matcher.text.push(token.value.clone()),
                TokenKind::Host => matcher.hosts.push(HostPattern::new(&token.value)),
            }
        }
        matcher
    }

    pub fn matches(&self, title: &str, url: &str) -> bool {
        self.text_ok(title, url) && self.host_ok(url)
    }

    fn text_ok(&self, title: &str, url: &str) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let title = title.to_lowercase();
        let url = url.to_lowercase();
        self.text
            .iter()
            .all(|term| title.contains(term.as_str()) || url.contains(term.as_str()))
    }

    fn host_ok(&self, url: &str) -> bool {
        if self.hosts.is_empty() {
            return true;
        }
        match get_domain(url) {
            Some(host) => self.hosts.iter().all(|p| p.matches(&host)),
            None => false,
        }
    }
}

/// Decide whether a single entry satisfies every token.
pub fn entry_matches(tokens: &[Token], title: &str, url: &str) -> bool {
    EntryMatcher::new(tokens).matches(title, url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse_tokens;

    #[test]
    fn plain_pattern_is_substring() {
        assert!(host_matches("mail.example.com", "example.com"));
        assert!(host_matches("mail.example.com", "ail.ex"));
        assert!(!host_matches("mail.example.com", "example.org"));
    }

    #[test]
    fn glob_requires_full_match() {
        assert!(host_matches("mail.example.com", "*.example.com"));
        assert!(!host_matches("example.com", "*.example.com"));
        assert!(host_matches("example.com", "*example.com"));
        assert!(!host_matches("mail.example.com.evil.net", "*.example.com"));
    }

    #[test]
    fn glob_escapes_metacharacters() {
        // `.` must be literal, not "any char"
        assert!(!host_matches("mailxexample.com", "mail.*"));
        assert!(host_matches("mail.example.com", "mail.*"));
        assert!(host_matches("a+b.test", "a+b.*"));
        assert!(!host_matches("aab.test", "a+b.*"));
    }

    #[test]
    fn glob_star_matches_empty_run() {
        assert!(host_matches("example.com", "example*.com"));
        assert!(host_matches("anything", "*"));
    }

    #[test]
    fn text_matches_title_case_insensitively() {
        assert!(entry_matches(
            &parse_tokens("foo"),
            "Foo Bar",
            "https://x.test/"
        ));
    }

    #[test]
    fn text_matches_url_as_well() {
        assert!(entry_matches(&parse_tokens("zzz"), "Foo", "https://zzz.test/"));
    }

    #[test]
    fn all_text_tokens_required() {
        let tokens = parse_tokens("rust book");
        assert!(entry_matches(&tokens, "The Rust Book", "https://doc.rust-lang.org/book/"));
        assert!(entry_matches(&tokens, "Rust", "https://x.test/book"));
        assert!(!entry_matches(&tokens, "Rust", "https://x.test/"));
    }

    #[test]
    fn empty_tokens_match_everything() {
        assert!(entry_matches(&[], "", ""));
        assert!(entry_matches(&[], "Anything", "not a url"));
    }

    #[test]
    fn host_tokens_need_parseable_url() {
        let tokens = parse_tokens("host:example");
        assert!(entry_matches(&tokens, "", "https://www.example.com/"));
        assert!(!entry_matches(&tokens, "example", "example"));
        assert!(!entry_matches(&tokens, "", "file:///example/index.html"));
    }

    #[test]
    fn host_tokens_are_anded() {
        let tokens = parse_tokens("host:mail host:*.example.com");
        assert!(entry_matches(&tokens, "", "https://mail.example.com/"));
        assert!(!entry_matches(&tokens, "", "https://www.example.com/"));
        assert!(!entry_matches(&tokens, "", "https://mail.other.com/"));
    }

    #[test]
    fn host_is_lowercased_before_matching() {
        let tokens = parse_tokens("host:EXAMPLE.com");
        assert!(entry_matches(&tokens, "", "https://WWW.Example.COM/path"));
    }

    #[test]
    fn text_and_host_combine() {
        let tokens = parse_tokens("inbox host:*.example.com");
        assert!(entry_matches(&tokens, "Inbox", "https://mail.example.com/"));
        assert!(!entry_matches(&tokens, "Drafts", "https://mail.example.com/"));
        assert!(!entry_matches(&tokens, "Inbox", "https://mail.other.com/"));
    }
}
