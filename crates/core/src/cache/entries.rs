//! Entry operations on a single named store.

use super::hash::compute_cache_key;
use super::stores::CacheStore;
use crate::fetch::Fetcher;
use crate::message::{WorkerRequest, WorkerResponse};
use crate::Error;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A response snapshot captured when it was written to a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub key_hash: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: DateTime<Utc>,
}

impl CachedResponse {
    /// How long ago the snapshot was written.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.stored_at
    }

    /// Rebuild the response exactly as it was stored.
    pub fn into_response(self) -> Result<WorkerResponse, Error> {
        let status = StatusCode::from_u16(self.status).map_err(|e| Error::InvalidEntry(e.to_string()))?;

        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidEntry(e.to_string()))?;
            let value = HeaderValue::from_bytes(&header_value_bytes(&value)?)
                .map_err(|e| Error::InvalidEntry(e.to_string()))?;
            headers.append(name, value);
        }

        Ok(WorkerResponse { status, headers, body: Bytes::from(self.body) })
    }
}

// Header values may carry obs-text bytes, so each byte is kept as one char
// (U+0000..=U+00FF) in the stored JSON.
fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().iter().map(|&b| char::from(b)).collect()))
        .collect()
}

fn header_value_bytes(value: &str) -> Result<Vec<u8>, Error> {
    value
        .chars()
        .map(|c| u8::try_from(c).map_err(|_| Error::InvalidEntry(format!("header byte out of range: {c:?}"))))
        .collect()
}

impl CacheStore {
    /// Store a copy of `response` under the identity of `request`.
    ///
    /// Creates the store if it does not exist yet. An existing entry for the
    /// same key is overwritten.
    pub async fn put(&self, request: &WorkerRequest, response: &WorkerResponse) -> Result<(), Error> {
        let name = self.name.clone();
        let method = request.method.as_str().to_string();
        let url = request.url.as_str().to_string();
        let key_hash = compute_cache_key(&method, &url);
        let status = response.status.as_u16();
        let headers_json =
            serde_json::to_string(&header_pairs(&response.headers)).map_err(|e| Error::InvalidEntry(e.to_string()))?;
        let body = response.body.to_vec();
        let now = Utc::now().to_rfc3339();

        self.storage
            .conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO caches (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![name, now],
                )?;
                tx.execute(
                    "INSERT INTO cache_entries (
                        cache_name, key_hash, method, url, status, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(cache_name, key_hash) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![name, key_hash, method, url, status, headers_json, body, now],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the stored response for `request`.
    ///
    /// Returns None if the store or the entry does not exist.
    pub async fn match_request(&self, request: &WorkerRequest) -> Result<Option<CachedResponse>, Error> {
        let name = self.name.clone();
        let key_hash = compute_cache_key(request.method.as_str(), request.url.as_str());

        self.storage
            .conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT key_hash, method, url, status, headers_json, body, stored_at
                     FROM cache_entries WHERE cache_name = ?1 AND key_hash = ?2",
                )?;

                let row = stmt.query_row(params![name, key_hash], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, u16>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Vec<u8>>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                });

                let (key_hash, method, url, status, headers_json, body, stored_at) = match row {
                    Ok(r) => r,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let headers: Vec<(String, String)> =
                    serde_json::from_str(&headers_json).map_err(|e| Error::InvalidEntry(e.to_string()))?;
                let stored_at = DateTime::parse_from_rfc3339(&stored_at)
                    .map_err(|e| Error::InvalidEntry(e.to_string()))?
                    .with_timezone(&Utc);

                Ok(Some(CachedResponse { key_hash, method, url, status, headers, body, stored_at }))
            })
            .await
            .map_err(Error::from)
    }

    /// Remove the entry for `request`. Returns false if there was none.
    pub async fn delete(&self, request: &WorkerRequest) -> Result<bool, Error> {
        let name = self.name.clone();
        let key_hash = compute_cache_key(request.method.as_str(), request.url.as_str());
        self.storage
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute(
                    "DELETE FROM cache_entries WHERE cache_name = ?1 AND key_hash = ?2",
                    params![name, key_hash],
                )?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in the store (0 if it does not exist).
    pub async fn len(&self) -> Result<u64, Error> {
        let name = self.name.clone();
        self.storage
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM cache_entries WHERE cache_name = ?1", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }

    /// Fetch every request and store all responses.
    ///
    /// All-or-nothing: if any fetch fails or answers non-2xx or partial
    /// content, nothing is written and the first failure is returned.
    pub async fn add_all(&self, fetcher: &dyn Fetcher, requests: &[WorkerRequest]) -> Result<(), Error> {
        let mut fetched = Vec::with_capacity(requests.len());
        for request in requests {
            let response = fetcher
                .fetch(request)
                .await
                .map_err(|e| Error::Network(format!("{}: {e}", request.url)))?;
            if !response.is_cacheable() {
                return Err(Error::HttpStatus {
                    status: response.status.as_u16(),
                    body: format!("{} returned {}", request.url, response.status),
                });
            }
            fetched.push((request, response));
        }

        for (request, response) in &fetched {
            self.put(request, response).await?;
        }

        tracing::debug!(store = %self.name, count = fetched.len(), "stored pre-cache entries");
        Ok(())
    }
}
