//! Query tokenizer.
//!
//! Splits a raw query on whitespace and commas into typed tokens:
//! - `host:<pattern>` constrains the hostname (prefix is case-insensitive)
//! - anything else is free text matched against title and url

const HOST_PREFIX: &str = "host:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Text,
    Host,
}

/// A single parsed unit of a query. `value` is always lower-cased and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn text(value: &str) -> Self {
        Token {
            kind: TokenKind::Text,
            value: value.to_lowercase(),
        }
    }

    pub fn host(value: &str) -> Self {
        Token {
            kind: TokenKind::Host,
            value: value.to_lowercase(),
        }
    }
}

/// Parse a raw query into tokens, preserving their order.
pub fn parse_tokens(raw: &str) -> Vec<Token> {
    let mut tokens = Vec::new();

    for fragment in raw
        .trim()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
    {
        match fragment.get(..HOST_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(HOST_PREFIX) => {
                let pattern = &fragment[HOST_PREFIX.len()..];
                if pattern.is_empty() {
                    log::debug!("Ignoring empty host constraint in query");
                } else {
                    tokens.push(Token::host(pattern));
                }
            }
            _ => tokens.push(Token::text(fragment)),
        }
    }

    tokens
}

/// Free-text portion of a token list, joined by single spaces.
/// Used as the pre-filter hint handed to the stores.
pub fn text_hint(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Text)
        .map(|t| t.value.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
