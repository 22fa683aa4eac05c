//! Feed records and the layers that produce them.
//!
//! - [`extract`] - map a parsed document tree onto a [`FeedRecord`]
//! - [`fetch_feed`] - conditional HTTP retrieval of the raw document
//! - [`discover`] - find the feed advertised by an HTML page
//!
//! # Example
//!
//! ```
//! use feedlet::feed::parse_feed;
//!
//! let doc = "<rss><channel><title>T</title><item><title>I1</title></item></channel></rss>";
//! let record = parse_feed(Some(doc)).unwrap();
//! assert_eq!(record.title, "T");
//! assert_eq!(record.entries[0].link, "No Entry Link");
//! ```

mod discovery;
mod extract;
mod fetcher;
mod record;

pub use discovery::{discover, find_feed_link, DiscoveryError};
pub use extract::{extract, parse_feed};
pub use fetcher::{fetch_feed, FetchError, FetchOptions, FetchOutcome};
pub use record::{EntryRecord, FeedRecord};
