//! Mock object store for testing and local development.
//!
//! The `MockBlobStore` keeps objects in memory and can be switched into a
//! failing mode to exercise error paths of callers.
//!
//! # Example
//!
//! ```ignore
//! use blob_store::{BlobStore, MockBlobStore};
//!
//! let store = MockBlobStore::new("http://localhost:8080/blobs");
//! let url = store.put("avatars/a.png", vec![0x89, 0x50], "image/png").await?;
//! assert!(store.contains("avatars/a.png"));
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::{BlobStore, BlobStoreError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-memory object store.
pub struct MockBlobStore {
    public_base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
    failing: AtomicBool,
}

impl MockBlobStore {
    pub fn new(public_base_url: &str) -> Self {
        Self {
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// A store whose writes are rejected until `set_failing(false)`.
    pub fn failing(public_base_url: &str) -> Self {
        let store = Self::new(public_base_url);
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Check if an object is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Get the number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MockBlobStore {
    fn default() -> Self {
        Self::new("http://localhost/blobs")
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BlobStoreError::Rejected(format!("mock store is failing: {}", key)));
        }

        self.objects.write().unwrap_or_else(PoisonError::into_inner).insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.object(key)
            .map(|object| object.bytes)
            .ok_or_else(|| BlobStoreError::NotFound(format!("object not found in mock: {}", key)))
    }
}
