//! Lexical scanning of raw document text into tag and text tokens.

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";
const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";
const DOCTYPE_OPEN: &str = "<!DOCTYPE";

/// A lexical token borrowed from the source text.
///
/// Tag tokens keep their delimiters (`<title>`, `</title>`, `<br/>`); whether
/// a tag opens, closes or self-closes is decided by the tree builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Tag(&'a str),
    Text(&'a str),
}

/// Splits `text` into an ordered sequence of tokens.
///
/// Every token is trimmed and empty tokens are dropped, so an empty or
/// whitespace-only document yields no tokens. CDATA sections become text
/// tokens holding only their inner text. Processing instructions, comments
/// and other `<!...>` declarations are skipped.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];

        if let Some(body) = rest.strip_prefix(CDATA_OPEN) {
            let (inner, consumed) = match body.find(CDATA_CLOSE) {
                Some(end) => (&body[..end], CDATA_OPEN.len() + end + CDATA_CLOSE.len()),
                None => (body, rest.len()),
            };
            push_trimmed(&mut tokens, inner, Token::Text);
            pos += consumed;
        } else if rest.starts_with(COMMENT_OPEN) {
            pos += match rest.find(COMMENT_CLOSE) {
                Some(end) => end + COMMENT_CLOSE.len(),
                None => rest.len(),
            };
        } else if starts_with_ignore_case(rest, DOCTYPE_OPEN) {
            let consumed = doctype_len(rest);
            tracing::debug!(declaration = %&rest[..consumed], "Skipping document type declaration");
            pos += consumed;
        } else if rest.starts_with('<') {
            // An unterminated tag runs to end of input.
            let consumed = rest.find('>').map_or(rest.len(), |end| end + 1);
            let raw = &rest[..consumed];
            if raw.starts_with("<?") || raw.starts_with("<!") {
                tracing::debug!(declaration = %raw, "Skipping markup declaration");
            } else {
                push_trimmed(&mut tokens, raw, Token::Tag);
            }
            pos += consumed;
        } else {
            let consumed = rest.find('<').unwrap_or(rest.len());
            push_trimmed(&mut tokens, &rest[..consumed], Token::Text);
            pos += consumed;
        }
    }

    tokens
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Byte length of a `<!DOCTYPE ...>` declaration.
///
/// A `>` inside the bracketed internal subset (`[ <!ENTITY a 'b'> ]`) does
/// not end the declaration. An unterminated one runs to end of input.
fn doctype_len(rest: &str) -> usize {
    let mut depth = 0usize;
    for (i, byte) in rest.bytes().enumerate() {
        match byte {
            b'[' => depth += 1,
            b']' => depth = depth.saturating_sub(1),
            b'>' if depth == 0 => return i + 1,
            _ => {}
        }
    }
    rest.len()
}

fn push_trimmed<'a>(tokens: &mut Vec<Token<'a>>, raw: &'a str, kind: fn(&'a str) -> Token<'a>) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        tokens.push(kind(trimmed));
    }
}
