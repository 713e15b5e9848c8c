//! Blob store access
//!
//! `BlobStore` is the object-store capability the endpoint consumes:
//! - `head`: metadata lookup by pathname (None when the blob does not exist)
//! - `fetch`: download a blob by its public URL, bypassing caches
//! - `put`: upload bytes under a pathname, returning where it can be read
//!
//! Backends:
//! - `vercel`: Vercel Blob HTTP API via reqwest
//! - `memory`: process-local map for local development and tests
//!
//! `FormStore` sits on top and implements the load/save protocol for the
//! single form document.

pub mod form_store;
pub mod memory;
pub mod vercel;

pub use form_store::FormStore;
pub use memory::MemoryBlobStore;
pub use vercel::VercelBlobStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Metadata returned by a successful `head`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobMetadata {
    pub url: String,
    #[serde(default)]
    pub download_url: Option<String>,
    pub pathname: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Result of a successful `put`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutBlobResult {
    pub url: String,
    pub pathname: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    /// Append a random suffix to the pathname instead of using it verbatim
    pub add_random_suffix: bool,
    /// Replace an existing blob at the same pathname
    pub allow_overwrite: bool,
    pub content_type: String,
}

impl PutOptions {
    /// Stable-pathname, overwriting JSON upload. Every blob either backend
    /// stores is publicly readable at the returned URL.
    pub fn json_overwrite() -> Self {
        Self {
            add_random_suffix: false,
            allow_overwrite: true,
            content_type: "application/json".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("blob request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("blob store responded with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("blob already exists: {0}")]
    AlreadyExists(String),

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid blob store configuration: {0}")]
    Config(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Look up blob metadata; `Ok(None)` when nothing is stored at `pathname`.
    async fn head(&self, pathname: &str) -> Result<Option<BlobMetadata>, StoreError>;

    /// Download the blob at `url` with caching disabled.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, StoreError>;

    async fn put(
        &self,
        pathname: &str,
        body: Vec<u8>,
        options: PutOptions,
    ) -> Result<PutBlobResult, StoreError>;
}
