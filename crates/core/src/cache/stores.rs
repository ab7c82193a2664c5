//! Store-level operations: enumerate, open, and delete named stores.

use super::connection::CacheStorage;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// Handle to a single named store.
///
/// Holding a handle does not create the store; the first successful
/// [`CacheStore::put`] does.
#[derive(Clone, Debug)]
pub struct CacheStore {
    pub(crate) storage: CacheStorage,
    pub(crate) name: String,
}

/// Name and entry count of an existing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub name: String,
    pub entries: u64,
}

impl CacheStore {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl CacheStorage {
    /// Names of all existing stores, oldest first.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM caches ORDER BY rowid")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Whether a store with this name exists.
    pub async fn has(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool =
                    conn.query_row("SELECT EXISTS(SELECT 1 FROM caches WHERE name = ?1)", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Get a handle to the named store without creating it.
    pub fn open_store(&self, name: impl Into<String>) -> CacheStore {
        CacheStore { storage: self.clone(), name: name.into() }
    }

    /// Delete a store and every entry in it.
    ///
    /// Returns false if no store had that name.
    pub async fn delete(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM caches WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Every existing store with its entry count, oldest first.
    pub async fn summaries(&self) -> Result<Vec<StoreSummary>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StoreSummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT c.name, COUNT(e.key_hash)
                     FROM caches c LEFT JOIN cache_entries e ON e.cache_name = c.name
                     GROUP BY c.name
                     ORDER BY c.rowid",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(StoreSummary { name: row.get(0)?, entries: row.get::<_, i64>(1)? as u64 })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{WorkerRequest, WorkerResponse};
    use http::StatusCode;

    async fn seed(storage: &CacheStorage, name: &str, url: &str) {
        let request = WorkerRequest::get(url).unwrap();
        storage
            .open_store(name)
            .put(&request, &WorkerResponse::new(StatusCode::OK).with_body("ok"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_open_store_is_lazy() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let store = storage.open_store("badminton-app-v1.0.0");
        assert_eq!(store.name(), "badminton-app-v1.0.0");
        assert!(!storage.has("badminton-app-v1.0.0").await.unwrap());
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_keys_in_creation_order() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        seed(&storage, "badminton-app-v1", "http://localhost/").await;
        seed(&storage, "badminton-api-v1", "http://localhost/api/matches").await;
        seed(&storage, "badminton-app-v1", "http://localhost/icon.png").await;

        assert_eq!(storage.keys().await.unwrap(), vec!["badminton-app-v1", "badminton-api-v1"]);
    }

    #[tokio::test]
    async fn test_delete_cascades_entries() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        seed(&storage, "badminton-app-v0", "http://localhost/").await;
        seed(&storage, "badminton-app-v0", "http://localhost/icon.png").await;

        assert!(storage.delete("badminton-app-v0").await.unwrap());
        assert!(!storage.has("badminton-app-v0").await.unwrap());

        let orphans: i64 = storage
            .conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        assert!(!storage.delete("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_summaries() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        seed(&storage, "badminton-app-v1", "http://localhost/").await;
        seed(&storage, "badminton-app-v1", "http://localhost/icon.png").await;
        seed(&storage, "badminton-api-v1", "http://localhost/api/matches").await;

        let summaries = storage.summaries().await.unwrap();
        assert_eq!(
            summaries,
            vec![
                StoreSummary { name: "badminton-app-v1".into(), entries: 2 },
                StoreSummary { name: "badminton-api-v1".into(), entries: 1 },
            ]
        );
    }
}
