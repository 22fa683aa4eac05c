use super::record::{EntryRecord, FeedRecord, NO_FEED_DESCRIPTION};
use crate::xml::{parse_document, search_all, search_first, Node, XmlError};

/// How one record field is resolved: candidate paths tried in order, then
/// a fallback when none of them yields text.
struct FieldRule {
    paths: &'static [&'static str],
    fallback: &'static str,
}

const FEED_TITLE: FieldRule = FieldRule {
    paths: &["channel/title"],
    fallback: "No Feed Title",
};
const FEED_LINK: FieldRule = FieldRule {
    paths: &["channel/link"],
    fallback: "No Feed Link",
};
const FEED_DESCRIPTION: FieldRule = FieldRule {
    paths: &["channel/description"],
    fallback: NO_FEED_DESCRIPTION,
};

const ENTRY_TITLE: FieldRule = FieldRule {
    paths: &["title"],
    fallback: "No Entry Title",
};
const ENTRY_LINK: FieldRule = FieldRule {
    paths: &["link"],
    fallback: "No Entry Link",
};
const ENTRY_DESCRIPTION: FieldRule = FieldRule {
    paths: &["description"],
    fallback: "No Entry Description",
};
const ENTRY_PUB_DATE: FieldRule = FieldRule {
    paths: &["pubDate"],
    fallback: "No Entry PubDate",
};

/// Candidate paths locating entries; the first that matches anything wins.
const ENTRY_PATHS: &[&str] = &["channel/item"];

/// Maps a document tree onto a [`FeedRecord`].
///
/// Never fails: a missing field resolves to its fallback string and a
/// document without items yields no entries.
pub fn extract(root: &Node) -> FeedRecord {
    let entries = extract_entries(root);
    tracing::debug!(entries = entries.len(), "Extracted feed");

    FeedRecord {
        title: resolve(root, &FEED_TITLE),
        link: resolve(root, &FEED_LINK),
        description: resolve(root, &FEED_DESCRIPTION),
        entries,
        last_fetch: None,
    }
}

/// Parses and extracts a document in one step.
///
/// # Errors
///
/// Any [`XmlError`] from parsing. Extraction itself cannot fail.
pub fn parse_feed(doc: Option<&str>) -> Result<FeedRecord, XmlError> {
    parse_document(doc).map(|root| extract(&root))
}

fn extract_entries(root: &Node) -> Vec<EntryRecord> {
    for path in ENTRY_PATHS {
        let items = search_all(root, path);
        if !items.is_empty() {
            return items.into_iter().map(extract_entry).collect();
        }
    }
    Vec::new()
}

fn extract_entry(item: &Node) -> EntryRecord {
    EntryRecord {
        title: resolve(item, &ENTRY_TITLE),
        link: resolve(item, &ENTRY_LINK),
        description: resolve(item, &ENTRY_DESCRIPTION),
        pub_date: resolve(item, &ENTRY_PUB_DATE),
        read: false,
    }
}

/// Inner text of the first node matched by the rule's paths, else its fallback.
///
/// A matched element with no text child counts as absent.
fn resolve(start: &Node, rule: &FieldRule) -> String {
    rule.paths
        .iter()
        .find_map(|path| search_first(start, path).and_then(Node::inner_text))
        .map(str::to_string)
        .unwrap_or_else(|| {
            tracing::debug!(paths = ?rule.paths, fallback = rule.fallback, "Field not found, using fallback");
            rule.fallback.to_string()
        })
}
