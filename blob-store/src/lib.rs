//! Object storage client for agent avatars.
//!
//! This crate provides:
//! - [`BlobSource`] config enum for choosing between mock and live stores
//! - [`BlobStore`] trait for abstracting object storage access
//! - [`HttpBlobStore`] production client that PUTs objects to an S3-style endpoint
//! - [`MockBlobStore`] in-memory store for tests and local development
//!
//! ## Usage with BlobSource (Recommended)
//!
//! ```ignore
//! use blob_store::BlobSource;
//!
//! // Development/testing: keep objects in memory
//! let store = BlobSource::mock("http://localhost:8080/blobs").into_store();
//!
//! // Production: upload to a bucket
//! let store = BlobSource::http(
//!     "https://s3.example.com",
//!     "agent-hunt",
//!     "https://agent-hunt.s3.example.com",
//!     None,
//! )
//! .into_store();
//!
//! let url = store.put("avatars/agent-1.png", bytes, "image/png").await?;
//! ```

mod mock;

pub use mock::MockBlobStore;

use async_trait::async_trait;
use reqwest::{header, Client as ReqwestClient, StatusCode};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("unexpected status {status} for {key}")]
    UnexpectedStatus { status: u16, key: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rejected: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, BlobStoreError>;

/// Trait for storing and retrieving opaque objects by key.
///
/// This trait abstracts the object store to enable dependency injection
/// and mocking for testing. Production code uses [`HttpBlobStore`], while
/// tests use [`MockBlobStore`].
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key` and return the public URL of the object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;

    /// Fetch the raw bytes stored under `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
}

/// Production object store client for S3-compatible endpoints.
///
/// Objects are written with `PUT {endpoint}/{bucket}/{key}` and marked
/// public-read; the returned URL is `{public_base_url}/{key}`.
pub struct HttpBlobStore {
    endpoint: String,
    bucket: String,
    public_base_url: String,
    token: Option<String>,
    client: ReqwestClient,
}

impl HttpBlobStore {
    pub fn new(endpoint: &str, bucket: &str, public_base_url: &str, token: Option<String>) -> Self {
        HttpBlobStore {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            token,
            client: ReqwestClient::new(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key.trim_start_matches('/'))
    }

    /// Public URL an object stored under `key` is served from.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let size = bytes.len();
        let request = self
            .client
            .put(self.object_url(key))
            .header(header::CONTENT_TYPE, content_type)
            .header("x-amz-acl", "public-read")
            .body(bytes);
        let res = self.authorize(request).send().await?;

        if !res.status().is_success() {
            return Err(BlobStoreError::UnexpectedStatus {
                status: res.status().as_u16(),
                key: key.to_string(),
            });
        }

        debug!(key, size, "Stored object");
        Ok(self.public_url(key))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let request = self.client.get(self.object_url(key));
        let res = self.authorize(request).send().await?;

        match res.status() {
            StatusCode::NOT_FOUND => Err(BlobStoreError::NotFound(key.to_string())),
            status if status.is_success() => Ok(res.bytes().await?.to_vec()),
            status => Err(BlobStoreError::UnexpectedStatus {
                status: status.as_u16(),
                key: key.to_string(),
            }),
        }
    }
}

/// Configuration for the object store.
///
/// Use this to explicitly choose between the mock and live stores.
#[derive(Debug, Clone)]
pub enum BlobSource {
    /// Keep objects in memory; URLs are built from `public_base_url`.
    Mock { public_base_url: String },

    /// Upload to an S3-compatible HTTP endpoint.
    Http {
        endpoint: String,
        bucket: String,
        public_base_url: String,
        token: Option<String>,
    },
}

impl BlobSource {
    pub fn mock(public_base_url: impl Into<String>) -> Self {
        Self::Mock {
            public_base_url: public_base_url.into(),
        }
    }

    pub fn http(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self::Http {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            public_base_url: public_base_url.into(),
            token,
        }
    }

    /// Create the appropriate BlobStore implementation.
    pub fn into_store(self) -> Box<dyn BlobStore> {
        match self {
            Self::Mock { public_base_url } => Box::new(MockBlobStore::new(&public_base_url)),
            Self::Http {
                endpoint,
                bucket,
                public_base_url,
                token,
            } => Box::new(HttpBlobStore::new(&endpoint, &bucket, &public_base_url, token)),
        }
    }
}
