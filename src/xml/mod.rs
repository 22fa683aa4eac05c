//! Forgiving XML processing for syndication documents.
//!
//! This is deliberately not a conforming XML parser. It handles the subset
//! real-world RSS feeds need and nothing else:
//!
//! - [`tokenizer`] - splits text into tag and text tokens, unwrapping CDATA
//! - [`builder`] - assembles tokens into a single rooted [`Node`] tree
//! - [`query`] - slash-delimited path searches over a tree
//!
//! Attributes, namespaces and entities are not interpreted. Every stage is a
//! pure function of its input.
//!
//! # Example
//!
//! ```
//! use feedlet::xml::{parse, search_first};
//!
//! let root = parse("<rss><channel><title>News</title></channel></rss>").unwrap();
//! let title = search_first(&root, "channel/title").and_then(|n| n.inner_text());
//! assert_eq!(title, Some("News"));
//! ```

mod builder;
mod node;
mod query;
mod tokenizer;

use thiserror::Error;

pub use builder::{build, MAX_NESTING_DEPTH};
pub use node::{Element, Node, StructuralError, Text};
pub use query::{search_all, search_first, PathQuery};
pub use tokenizer::{tokenize, Token};

/// Errors that abort a parse. No partial tree is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    /// No document was supplied at all (as opposed to an empty one).
    #[error("no document supplied")]
    EmptyInput,

    /// A node could not be constructed.
    #[error("invalid node: {0}")]
    Structural(#[from] StructuralError),

    /// A closing tag arrived with no element open.
    #[error("malformed document: unbalanced closing tag {0}")]
    UnbalancedClosingTag(String),

    /// Text appeared before the root opened or after it closed.
    #[error("malformed document: text outside of any element")]
    TextOutsideElement,

    /// Input ended while this element was still open.
    #[error("malformed document: element <{0}> is never closed")]
    UnclosedElement(String),

    /// A second top-level element followed the root.
    #[error("malformed document: second root element <{0}>")]
    MultipleRoots(String),

    /// The document contained no element.
    #[error("malformed document: no root element")]
    NoRootElement,

    /// Too many elements were open at once.
    #[error("malformed document: nesting exceeds {0} levels")]
    NestingTooDeep(usize),
}

impl XmlError {
    /// Whether this error describes a badly structured document, as opposed
    /// to missing input or an invalid node payload.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, XmlError::EmptyInput | XmlError::Structural(_))
    }
}

/// Tokenizes and builds `text` into a tree.
pub fn parse(text: &str) -> Result<Node, XmlError> {
    build(tokenize(text))
}

/// Like [`parse`], for callers whose document may be absent entirely.
///
/// `None` fails with [`XmlError::EmptyInput`].
pub fn parse_document(doc: Option<&str>) -> Result<Node, XmlError> {
    let text = doc.ok_or(XmlError::EmptyInput)?;
    let root = parse(text)?;
    tracing::debug!(nodes = root.node_count(), "Parsed document");
    Ok(root)
}
