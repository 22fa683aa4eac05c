//! Core of a small RSS reader.
//!
//! Raw feed text flows through a forgiving XML stack into domain records:
//!
//! ```text
//! text -> xml::tokenize -> xml::build -> Node -> feed::extract -> FeedRecord
//! ```
//!
//! Fetching ([`feed::fetch_feed`]) and persistence ([`storage::FeedStore`])
//! sit around that pipeline; neither is needed to parse or extract.

pub mod config;
pub mod feed;
pub mod storage;
pub mod xml;
