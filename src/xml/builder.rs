use super::node::{Element, Node};
use super::tokenizer::Token;
use super::XmlError;

/// Maximum number of simultaneously open elements.
///
/// Queries, serialization and drop all recurse over the tree, so a hostile
/// document nested thousands of levels deep is rejected up front.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Builds a single rooted tree from a token sequence.
///
/// Uses an explicit stack of in-progress elements. Closing tags pop the
/// stack without comparing names; self-closing tags are attached but never
/// pushed. Any structural failure aborts the build and no partial tree is
/// returned.
///
/// # Errors
///
/// - [`XmlError::UnbalancedClosingTag`] for a close with nothing open
/// - [`XmlError::TextOutsideElement`] for text with nothing open
/// - [`XmlError::UnclosedElement`] when input ends with elements still open
/// - [`XmlError::MultipleRoots`] for a second top-level element
/// - [`XmlError::NoRootElement`] when the sequence holds no element at all
/// - [`XmlError::NestingTooDeep`] past [`MAX_NESTING_DEPTH`] open elements
/// - [`XmlError::Structural`] for a tag token with an empty name
pub fn build<'a, I>(tokens: I) -> Result<Node, XmlError>
where
    I: IntoIterator<Item = Token<'a>>,
{
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Node> = None;

    for token in tokens {
        match token {
            Token::Tag(raw) if raw.starts_with("</") => {
                let open = stack
                    .pop()
                    .ok_or_else(|| XmlError::UnbalancedClosingTag(raw.to_string()))?;
                let closing = tag_name(&raw[2..]);
                if closing != open.tag() {
                    tracing::debug!(
                        open = %open.tag(),
                        closing = %closing,
                        "Closing tag name does not match open element"
                    );
                }
                attach(&mut stack, &mut root, Node::Element(open))?;
            }
            Token::Tag(raw) => {
                let element = Element::new(tag_name(&raw[1..]), Vec::new())?;
                if raw.ends_with("/>") {
                    attach(&mut stack, &mut root, Node::Element(element))?;
                    continue;
                }
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::MultipleRoots(element.tag().to_string()));
                }
                if stack.len() >= MAX_NESTING_DEPTH {
                    return Err(XmlError::NestingTooDeep(MAX_NESTING_DEPTH));
                }
                stack.push(element);
            }
            Token::Text(raw) => {
                let parent = stack.last_mut().ok_or(XmlError::TextOutsideElement)?;
                parent.push_child(Node::text(raw)?);
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::UnclosedElement(open.tag().to_string()));
    }

    root.ok_or(XmlError::NoRootElement)
}

/// Appends a finished node to the current stack top, or installs it as root.
fn attach(stack: &mut [Element], root: &mut Option<Node>, node: Node) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.push_child(node);
        return Ok(());
    }
    if root.is_some() {
        let tag = node.tag().unwrap_or_default().to_string();
        return Err(XmlError::MultipleRoots(tag));
    }
    *root = Some(node);
    Ok(())
}

/// Tag name of a raw tag token with its leading `<` or `</` removed.
///
/// The name ends at the first whitespace, `/` or `>`; attributes are ignored
/// and case is preserved.
fn tag_name(after_open: &str) -> &str {
    let end = after_open
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(after_open.len());
    &after_open[..end]
}
