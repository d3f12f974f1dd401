//! Object-store seam and the in-memory bucket backing it.
//!
//! Production: replace `MemoryBucket` with an S3-compatible client behind the
//! same trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use campzap_core::error::{DashboardError, DashboardResult};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub last_modified: DateTime<Utc>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Objects whose keys start with `prefix`, in no particular order.
    async fn list(&self, prefix: &str) -> DashboardResult<Vec<StoredObject>>;

    async fn put(&self, key: &str, content_type: Option<String>, bytes: Vec<u8>)
        -> DashboardResult<()>;

    async fn delete(&self, key: &str) -> DashboardResult<()>;
}

#[derive(Default)]
pub struct MemoryBucket {
    objects: DashMap<String, (StoredObject, Vec<u8>)>,
}

impl MemoryBucket {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MemoryBucket {
    async fn list(&self, prefix: &str) -> DashboardResult<Vec<StoredObject>> {
        Ok(self
            .objects
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.value().0.clone())
            .collect())
    }

    async fn put(
        &self,
        key: &str,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> DashboardResult<()> {
        let object = StoredObject {
            key: key.to_string(),
            size: bytes.len() as u64,
            content_type,
            last_modified: Utc::now(),
        };
        self.objects.insert(key.to_string(), (object, bytes));
        Ok(())
    }

    async fn delete(&self, key: &str) -> DashboardResult<()> {
        self.objects
            .remove(key)
            .map(|_| ())
            .ok_or(DashboardError::NotFound)
    }
}
