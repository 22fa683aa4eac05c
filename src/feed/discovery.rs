use thiserror::Error;

use super::fetcher::{fetch_feed, FetchError, FetchOptions, FetchOutcome};

/// `type` values that mark a `<link>` as pointing at a feed.
const FEED_TYPES: [&str; 2] = ["application/rss+xml", "application/atom+xml"];

/// Errors that can occur during feed discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The page itself could not be fetched
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The page is not a feed and advertises no RSS/Atom link
    #[error("not a feed: no RSS/Atom link found")]
    NotAFeed,
    /// The advertised feed link does not resolve to an http(s) URL
    #[error("invalid feed link: {0}")]
    InvalidFeedLink(String),
}

/// Finds the feed behind `url`.
///
/// A URL whose body already parses as an `<rss>` document is returned as
/// is. Otherwise the body is scanned as HTML and the first advertised feed
/// link is returned, resolved against `url`.
///
/// # Errors
///
/// Returns [`DiscoveryError::Fetch`] when the page cannot be retrieved,
/// [`DiscoveryError::NotAFeed`] when it advertises nothing, and
/// [`DiscoveryError::InvalidFeedLink`] for a non-http(s) link.
pub async fn discover(
    client: &reqwest::Client,
    url: &str,
    options: &FetchOptions,
) -> Result<String, DiscoveryError> {
    let body = match fetch_feed(client, url, None, options).await? {
        FetchOutcome::Fetched { body, .. } => body,
        FetchOutcome::NotModified => return Err(DiscoveryError::NotAFeed),
    };

    if is_rss_document(&body) {
        tracing::debug!(url = %url, "URL is already a feed");
        return Ok(url.to_owned());
    }

    let link = find_feed_link(&body, url).ok_or(DiscoveryError::NotAFeed)?;
    match url::Url::parse(&link) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
            tracing::info!(page = %url, feed = %link, "Discovered feed link");
            Ok(link)
        }
        _ => Err(DiscoveryError::InvalidFeedLink(link)),
    }
}

fn is_rss_document(body: &str) -> bool {
    crate::xml::parse(body)
        .map(|root| root.tag() == Some("rss"))
        .unwrap_or(false)
}

/// Scans HTML for the first `<link>` whose `type` is RSS or Atom.
///
/// Plain string scanning, no HTML parser. The `rel` attribute is not
/// consulted. The `href` is resolved against `base_url`.
pub fn find_feed_link(html: &str, base_url: &str) -> Option<String> {
    // ASCII lowering keeps byte offsets valid in the original text.
    let html_lower = html.to_ascii_lowercase();
    let mut search_from = 0;

    while let Some(link_start) = html_lower[search_from..].find("<link") {
        let abs_start = search_from + link_start;
        let tag_end = html_lower[abs_start..].find('>')?;
        let tag = &html[abs_start..=abs_start + tag_end];

        if is_feed_type(tag) {
            if let Some(href) = extract_attr_value(tag, "href") {
                return Some(resolve_url(href.trim(), base_url));
            }
        }

        search_from = abs_start + tag_end + 1;
    }

    None
}

fn is_feed_type(tag: &str) -> bool {
    extract_attr_value(tag, "type").is_some_and(|value| {
        FEED_TYPES
            .iter()
            .any(|feed_type| value.trim().eq_ignore_ascii_case(feed_type))
    })
}

/// Value of a quoted attribute, matched case-insensitively on the name.
fn extract_attr_value<'a>(tag: &'a str, attr_name: &str) -> Option<&'a str> {
    let tag_lower = tag.to_ascii_lowercase();
    let attr_prefix = format!(" {attr_name}=");

    let attr_start = tag_lower
        .find(&attr_prefix)
        .or_else(|| tag_lower.find(&format!("\t{attr_name}=")))
        .or_else(|| tag_lower.find(&format!("\n{attr_name}=")))?;
    let rest = &tag[attr_start + attr_prefix.len()..];

    let quote = *rest.as_bytes().first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let inner = &rest[1..];
    let end = inner.find(quote as char)?;
    Some(&inner[..end])
}

/// Resolves a possibly relative `href` against the page URL.
fn resolve_url(href: &str, base_url: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_owned();
    }

    // Protocol-relative: normalize through the URL parser.
    if href.starts_with("//") {
        if let Ok(parsed) = url::Url::parse(&format!("https:{href}")) {
            return parsed.to_string();
        }
    }

    url::Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(|resolved| resolved.to_string())
        .unwrap_or_else(|_| href.to_owned())
}
