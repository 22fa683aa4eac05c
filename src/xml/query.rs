//! Slash-delimited path queries over a document tree.
//!
//! A traversal accumulates the tag chain of every visited element as
//! `/tag1/tag2/...`, starting from the element the search is invoked on.
//! Absolute paths (leading `/`) must equal that chain exactly. Relative
//! paths match whenever the chain *ends with* them. The comparison is on
//! characters, not segments: a relative `b/c` also matches the chain `/ab/c`.
//! Existing feeds depend on this lenient matching, so it is kept as is.
//! Descendants of a match never match on its behalf, since their chains
//! extend past the path.
//!
//! Text leaves carry no tag and never match.

use super::node::Node;

/// A parsed path expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathQuery<'p> {
    /// Anchored at the search root; the full tag chain must be equal.
    Absolute(&'p str),
    /// Matches any tag chain ending with the path.
    Relative(&'p str),
}

impl<'p> PathQuery<'p> {
    pub fn new(path: &'p str) -> Self {
        if path.starts_with('/') {
            PathQuery::Absolute(path)
        } else {
            PathQuery::Relative(path)
        }
    }

    /// Whether an accumulated tag chain satisfies this query.
    pub fn matches(&self, chain: &str) -> bool {
        match self {
            PathQuery::Absolute(path) => chain == *path,
            PathQuery::Relative(path) => chain.ends_with(path),
        }
    }
}

/// Every element under `root` (inclusive) matching `path`, in document order.
///
/// A match does not prune its own subtree, so nested matches are returned
/// after their matching ancestor.
pub fn search_all<'n>(root: &'n Node, path: &str) -> Vec<&'n Node> {
    let query = PathQuery::new(path);
    let mut matches = Vec::new();
    collect_all(root, &mut String::new(), query, &mut matches);
    matches
}

fn collect_all<'n>(
    node: &'n Node,
    chain: &mut String,
    query: PathQuery<'_>,
    matches: &mut Vec<&'n Node>,
) {
    let Some(tag) = node.tag() else {
        return;
    };
    let parent_len = chain.len();
    chain.push('/');
    chain.push_str(tag);

    if query.matches(chain) {
        matches.push(node);
    }
    for child in node.children() {
        collect_all(child, chain, query, matches);
    }

    chain.truncate(parent_len);
}

/// The first element under `root` (inclusive) matching `path`, if any.
///
/// Pre-order and lazy: the node itself is tested, then its children in
/// order, and the first child branch that yields a match ends the search.
/// Later siblings are never visited.
pub fn search_first<'n>(root: &'n Node, path: &str) -> Option<&'n Node> {
    find_first(root, &mut String::new(), PathQuery::new(path))
}

fn find_first<'n>(node: &'n Node, chain: &mut String, query: PathQuery<'_>) -> Option<&'n Node> {
    let tag = node.tag()?;
    let parent_len = chain.len();
    chain.push('/');
    chain.push_str(tag);

    let found = if query.matches(chain) {
        Some(node)
    } else {
        node.children()
            .iter()
            .find_map(|child| find_first(child, chain, query))
    };

    chain.truncate(parent_len);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;

    fn texts(nodes: &[&Node]) -> Vec<String> {
        nodes.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_path_query_kind() {
        assert_eq!(PathQuery::new("/a/b"), PathQuery::Absolute("/a/b"));
        assert_eq!(PathQuery::new("a/b"), PathQuery::Relative("a/b"));
    }

    #[test]
    fn test_absolute_requires_full_chain() {
        let root = parse("<a><b><c>1</c></b><x><b><c>2</c></b></x><b><c>3</c></b></a>").unwrap();
        let found = search_all(&root, "/a/b/c");
        assert_eq!(texts(&found), vec!["<c>1</c>", "<c>3</c>"]);

        assert!(search_all(&root, "/b/c").is_empty());
        assert!(search_all(&root, "/a/b/c/d").is_empty());
    }

    #[test]
    fn test_absolute_matches_root() {
        let root = parse("<a><b>1</b></a>").unwrap();
        let found = search_all(&root, "/a");
        assert_eq!(found.len(), 1);
        assert!(std::ptr::eq(found[0], &root));
    }

    #[test]
    fn test_relative_matches_at_any_depth() {
        let root = parse("<a><b><c>1</c></b><x><b><c>2</c></b></x></a>").unwrap();
        let found = search_all(&root, "b/c");
        assert_eq!(texts(&found), vec!["<c>1</c>", "<c>2</c>"]);
    }

    #[test]
    fn test_relative_substring_is_not_segment_aligned() {
        let root = parse("<root><ab><c>quirk</c></ab></root>").unwrap();
        let found = search_all(&root, "b/c");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].inner_text(), Some("quirk"));

        // Tag suffixes match too: "/rss/subitem" ends with "item".
        let root = parse("<rss><subitem>1</subitem><items>2</items></rss>").unwrap();
        let found = search_all(&root, "item");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].inner_text(), Some("1"));
    }

    #[test]
    fn test_relative_match_excludes_descendants() {
        let root = parse(
            "<rss><channel><item><title>A</title><link>L</link></item>\
             <item><title>B</title><guid>g</guid></item></channel></rss>",
        )
        .unwrap();
        let found = search_all(&root, "channel/item");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|n| n.tag() == Some("item")));
        assert_eq!(found[0].children()[0].inner_text(), Some("A"));
        assert_eq!(found[1].children()[0].inner_text(), Some("B"));
    }

    #[test]
    fn test_match_does_not_prune_subtree() {
        let root = parse("<r><item><item>inner</item></item></r>").unwrap();
        let found = search_all(&root, "item");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].tag(), Some("item"));
        assert_eq!(found[1].inner_text(), Some("inner"));
    }

    #[test]
    fn test_text_nodes_never_match() {
        let root = parse("<r><t>title</t></r>").unwrap();
        let found = search_all(&root, "title");
        assert!(found.is_empty());
    }

    #[test]
    fn test_search_first_takes_first_branch() {
        let root =
            parse("<root><item><title>I1</title></item><item><title>I2</title></item></root>")
                .unwrap();

        let first = search_first(&root, "title").unwrap();
        assert_eq!(first.inner_text(), Some("I1"));

        let all = search_all(&root, "title");
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].inner_text(), Some("I2"));
    }

    #[test]
    fn test_search_first_agrees_with_search_all_head() {
        let root = parse(
            "<rss><channel><item><title>A</title></item><title>Feed</title></channel></rss>",
        )
        .unwrap();
        for path in ["title", "channel/title", "item/title", "/rss/channel/title", "missing"] {
            let first = search_first(&root, path);
            let all = search_all(&root, path);
            assert_eq!(first, all.first().copied(), "path {path}");
        }
    }

    #[test]
    fn test_search_first_returns_none() {
        let root = parse("<a><b>1</b></a>").unwrap();
        assert!(search_first(&root, "c").is_none());
        assert!(search_first(&root, "/b").is_none());
    }

    #[test]
    fn test_search_first_tests_root_itself() {
        let root = parse("<item><title>t</title></item>").unwrap();
        let found = search_first(&root, "item").unwrap();
        assert!(std::ptr::eq(found, &root));
    }

    #[test]
    fn test_search_is_relative_to_subtree_root() {
        let root = parse("<rss><channel><item><link>L</link></item></channel></rss>").unwrap();
        let item = search_first(&root, "channel/item").unwrap();
        assert!(search_first(item, "/item/link").is_some());
        assert!(search_first(item, "/rss/channel/item/link").is_none());
    }

    #[test]
    fn test_search_on_text_node() {
        let leaf = Node::text("plain").unwrap();
        assert!(search_all(&leaf, "").is_empty());
        assert!(search_first(&leaf, "plain").is_none());
    }
}
