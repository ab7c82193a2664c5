//! Mapping from the public origin to the real upstreams.
//!
//! The client shell only ever talks to one origin. Requests are forwarded
//! by path prefix:
//!
//! - `/api/<rest>` → `<api_upstream>/<rest>` (the `/api` prefix is dropped)
//! - `/uploads/<rest>` → `<api_upstream>/uploads/<rest>`
//! - anything else → `<static_origin>/<path>`
//!
//! Query strings are carried over unchanged.

use birdie_core::{AppConfig, Error};
use url::Url;

/// One prefix rewrite: a path starting with `source` is sent to
/// `destination` with the prefix replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    pub source: String,
    pub destination: Url,
}

impl RewriteRule {
    pub fn new(source: &str, destination: &str) -> Result<Self, Error> {
        let mut destination = destination.to_string();
        if !destination.ends_with('/') {
            destination.push('/');
        }
        let destination = Url::parse(&destination).map_err(|e| Error::InvalidUrl(format!("{destination}: {e}")))?;

        let mut source = source.to_string();
        if !source.ends_with('/') {
            source.push('/');
        }

        Ok(Self { source, destination })
    }
}

/// Upstream routing table.
#[derive(Debug, Clone)]
pub struct Upstreams {
    rules: Vec<RewriteRule>,
    static_origin: Url,
}

impl Upstreams {
    pub fn new(static_origin: &str, rules: Vec<RewriteRule>) -> Result<Self, Error> {
        let static_origin = Url::parse(static_origin).map_err(|e| Error::InvalidUrl(format!("{static_origin}: {e}")))?;
        Ok(Self { rules, static_origin })
    }

    /// Routing table for the deployment described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let api_base = config.api_upstream.trim_end_matches('/');
        let rules = vec![
            RewriteRule::new(&config.api_prefix, api_base)?,
            RewriteRule::new("/uploads/", &format!("{api_base}/uploads/"))?,
        ];
        Self::new(&config.static_origin, rules)
    }

    /// Where a request for `url` must actually be sent.
    pub fn resolve(&self, url: &Url) -> Result<Url, Error> {
        let path = url.path();

        let mut target = match self.rules.iter().find(|r| path.starts_with(&r.source)) {
            Some(rule) => {
                let rest = &path[rule.source.len()..];
                Url::parse(&format!("{}{rest}", rule.destination)).map_err(|e| Error::InvalidUrl(e.to_string()))?
            }
            None => {
                let mut target = self.static_origin.clone();
                target.set_path(path);
                target
            }
        };

        target.set_query(url.query());
        Ok(target)
    }
}
