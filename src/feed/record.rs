use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub(crate) const NO_FEED_DESCRIPTION: &str = "No Feed Description";

/// Domain representation of a syndication channel.
///
/// Serializes to the persisted shape
/// `{ title, link, description, lastFetch, entries }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRecord {
    pub title: String,
    pub link: String,
    /// Older stores did not persist the description.
    #[serde(default = "default_feed_description")]
    pub description: String,
    #[serde(default)]
    pub entries: Vec<EntryRecord>,
    /// Opaque marker from the last successful fetch (a `Last-Modified` value).
    #[serde(default)]
    pub last_fetch: Option<String>,
}

/// Domain representation of one syndicated item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String,
    #[serde(default)]
    pub read: bool,
}

fn default_feed_description() -> String {
    NO_FEED_DESCRIPTION.to_string()
}

impl FeedRecord {
    /// Carries read flags over from a previously extracted record.
    ///
    /// Entries have no stable identity across extractions, so continuity is
    /// by title: a fresh entry becomes read when `previous` holds a read
    /// entry with an equal title. Entries already marked read stay read.
    pub fn merge_read_state(&mut self, previous: &FeedRecord) {
        let read_titles: HashSet<&str> = previous
            .entries
            .iter()
            .filter(|entry| entry.read)
            .map(|entry| entry.title.as_str())
            .collect();

        if read_titles.is_empty() {
            return;
        }

        for entry in &mut self.entries {
            if read_titles.contains(entry.title.as_str()) {
                entry.read = true;
            }
        }
    }

    /// Sets the read flag of the entry at `index`.
    ///
    /// Returns `false` when `index` is out of range.
    pub fn set_read(&mut self, index: usize, read: bool) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.read = read;
                true
            }
            None => false,
        }
    }

    pub fn set_all_read(&mut self, read: bool) {
        for entry in &mut self.entries {
            entry.read = read;
        }
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.read).count()
    }
}
