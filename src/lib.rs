//! Search and bulk-delete browser history and bookmarks with one query syntax.
//!
//! A query such as `rust host:*.example.com` is split into tokens
//! ([`query`]), matched against every entry ([`matcher`]), and run against a
//! history store and a bookmark store at once ([`engine`]). [`session`] holds
//! the preview state a front end renders and selects from.

pub mod alfred;
pub mod bookmarks;
pub mod browser;
pub mod config;
pub mod db;
pub mod engine;
pub mod history;
pub mod matcher;
pub mod query;
pub mod search;
pub mod session;
pub mod settings;
pub mod store;
pub mod utils;
