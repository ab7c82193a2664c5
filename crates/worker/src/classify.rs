//! Request classification.

use http::Method;
use serde::Serialize;

/// Which strategy handles an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Cache-first from the static store.
    Static,
    /// Network-first, falling back to the API store.
    CacheableApi,
    /// Network only.
    NonCacheableApi,
    /// Not intercepted.
    Passthrough,
}

/// Maps method + path to a [`Classification`].
#[derive(Debug, Clone)]
pub struct Classifier {
    api_prefix: String,
    patterns: Vec<String>,
}

impl Classifier {
    pub fn new(api_prefix: impl Into<String>, patterns: Vec<String>) -> Self {
        Self { api_prefix: api_prefix.into(), patterns }
    }

    pub fn classify(&self, method: &Method, path: &str) -> Classification {
        if path.starts_with(&self.api_prefix) {
            if *method == Method::GET && self.is_cacheable(path) {
                Classification::CacheableApi
            } else {
                Classification::NonCacheableApi
            }
        } else if *method == Method::GET {
            Classification::Static
        } else {
            Classification::Passthrough
        }
    }

    // Suffix match, so `/api/v2/matches` also counts as `/api/matches`.
    fn is_cacheable(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| path == p || path.ends_with(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new(
            "/api/",
            ["/api/users/me", "/api/matches", "/api/tournaments", "/api/leaderboard"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
    }

    #[test]
    fn test_cacheable_api() {
        let c = classifier();
        assert_eq!(c.classify(&Method::GET, "/api/matches"), Classification::CacheableApi);
        assert_eq!(c.classify(&Method::GET, "/api/users/me"), Classification::CacheableApi);
        assert_eq!(c.classify(&Method::GET, "/api/tournaments"), Classification::CacheableApi);
        assert_eq!(c.classify(&Method::GET, "/api/leaderboard"), Classification::CacheableApi);
    }

    #[test]
    fn test_non_cacheable_api() {
        let c = classifier();
        assert_eq!(c.classify(&Method::GET, "/api/posts"), Classification::NonCacheableApi);
        assert_eq!(c.classify(&Method::GET, "/api/matches/12"), Classification::NonCacheableApi);
        assert_eq!(c.classify(&Method::POST, "/api/matches"), Classification::NonCacheableApi);
        assert_eq!(c.classify(&Method::DELETE, "/api/users/me"), Classification::NonCacheableApi);
    }

    #[test]
    fn test_static_and_passthrough() {
        let c = classifier();
        assert_eq!(c.classify(&Method::GET, "/"), Classification::Static);
        assert_eq!(c.classify(&Method::GET, "/static/js/bundle.js"), Classification::Static);
        assert_eq!(c.classify(&Method::GET, "/apiary"), Classification::Static);
        assert_eq!(c.classify(&Method::POST, "/upload"), Classification::Passthrough);
        assert_eq!(c.classify(&Method::HEAD, "/"), Classification::Passthrough);
    }

    #[test]
    fn test_deterministic() {
        let c = classifier();
        let first = c.classify(&Method::GET, "/api/matches");
        for _ in 0..3 {
            assert_eq!(c.classify(&Method::GET, "/api/matches"), first);
        }
    }
}
