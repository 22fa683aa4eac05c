use std::fmt;
use thiserror::Error;

/// Errors raised when a node would be constructed with an empty payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// Element tags must be non-empty.
    #[error("element tag must not be empty")]
    EmptyTag,

    /// Text nodes must carry non-empty content.
    #[error("text node content must not be empty")]
    EmptyText,
}

/// A text leaf. Content is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    content: String,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Result<Self, StructuralError> {
        let content = content.into();
        if content.is_empty() {
            return Err(StructuralError::EmptyText);
        }
        Ok(Self { content })
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// An element with an ordered list of owned children. The tag is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>, children: Vec<Node>) -> Result<Self, StructuralError> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(StructuralError::EmptyTag);
        }
        Ok(Self { tag, children })
    }

    /// Returns the element with `child` appended as its last child.
    ///
    /// Consumes `self`: a finished tree is never mutated in place, it is
    /// rebuilt through the same constructive API.
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Appends to an element still under construction by the tree builder.
    pub(super) fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Content of the first `Text` child, if any.
    pub fn inner_text(&self) -> Option<&str> {
        self.children.iter().find_map(|child| match child {
            Node::Text(text) => Some(text.content()),
            Node::Element(_) => None,
        })
    }
}

/// A node of the document tree: a text leaf or an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(Text),
    Element(Element),
}

impl Node {
    pub fn text(content: impl Into<String>) -> Result<Self, StructuralError> {
        Text::new(content).map(Node::Text)
    }

    pub fn element(tag: impl Into<String>, children: Vec<Node>) -> Result<Self, StructuralError> {
        Element::new(tag, children).map(Node::Element)
    }

    /// The element tag, or `None` for text leaves.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Element(element) => Some(element.tag()),
            Node::Text(_) => None,
        }
    }

    /// Children of an element; text leaves have none.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => element.children(),
            Node::Text(_) => &[],
        }
    }

    /// The literal content of a text leaf.
    pub fn content(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text.content()),
            Node::Element(_) => None,
        }
    }

    /// Content of the first `Text` child of an element.
    ///
    /// Text leaves have no children, so this is `None` for them.
    pub fn inner_text(&self) -> Option<&str> {
        match self {
            Node::Element(element) => element.inner_text(),
            Node::Text(_) => None,
        }
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Node::node_count).sum::<usize>()
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// Canonical serialization: `<tag>` + children + `</tag>`, text verbatim.
///
/// Attributes, self-closing form and inter-tag whitespace are not reproduced.
impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.tag)?;
        for child in &self.children {
            write!(f, "{child}")?;
        }
        write!(f, "</{}>", self.tag)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(text) => f.write_str(text.content()),
            Node::Element(element) => fmt::Display::fmt(element, f),
        }
    }
}
