//! In-process [`ObjectStore`] keyed by `(bucket, key)`.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::{ObjectStore, UploadError};

/// Keeps uploaded objects in memory. Never fails.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the object at `bucket`/`key`, if any.
    #[must_use]
    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// All stored keys in `bucket`, sorted.
    #[must_use]
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), UploadError> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((bucket.to_string(), key.to_string()), body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_overwrites_and_scopes_by_bucket() {
        let store = MemoryStore::new();
        store.put("a", "raw/x.csv", b"1".to_vec()).await.unwrap();
        store.put("a", "raw/x.csv", b"2".to_vec()).await.unwrap();
        store.put("b", "raw/y.csv", b"3".to_vec()).await.unwrap();

        assert_eq!(store.get("a", "raw/x.csv"), Some(b"2".to_vec()));
        assert_eq!(store.keys("a"), vec!["raw/x.csv"]);
        assert_eq!(store.keys("b"), vec!["raw/y.csv"]);
        assert!(store.get("a", "raw/y.csv").is_none());
    }
}
