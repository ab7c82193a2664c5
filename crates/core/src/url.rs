//! Request URL canonicalization.
//!
//! Two requests share a cache entry only if their canonical URLs are equal.
//! Parsing already lowercases http(s) hosts and drops default ports; on top
//! of that the fragment is removed, since it never reaches the server. The
//! query is part of the identity and is kept byte for byte.

use url::{ParseError, Url};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("relative URL not allowed: {0}")]
    Relative(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("malformed URL: {0}")]
    Malformed(String),
}

pub fn canonicalize(input: &str) -> Result<Url, UrlError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut url = Url::parse(input).map_err(|e| match e {
        ParseError::RelativeUrlWithoutBase => UrlError::Relative(input.to_string()),
        other => UrlError::Malformed(other.to_string()),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }

    url.set_fragment(None);
    Ok(url)
}
