//! In-memory blob store
//!
//! Keeps blobs in a process-local map and serves them under a configurable
//! URL prefix. Used when no remote blob token is configured and by the tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::RwLock;

use super::{BlobMetadata, BlobStore, PutBlobResult, PutOptions, StoreError};

pub use crate::config::DEFAULT_MEMORY_BASE_URL as DEFAULT_BASE_URL;

/// Length of the random pathname suffix, matching Vercel Blob
const RANDOM_SUFFIX_LEN: usize = 21;

#[derive(Debug, Clone)]
struct StoredBlob {
    body: Vec<u8>,
    content_type: String,
    uploaded_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct MemoryBlobStore {
    base_url: String,
    blobs: RwLock<HashMap<String, StoredBlob>>,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl MemoryBlobStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            blobs: RwLock::new(HashMap::new()),
        }
    }

    pub fn url_for(&self, pathname: &str) -> String {
        format!("{}/{}", self.base_url, pathname)
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    fn pathname_for(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(str::to_string)
    }
}

/// `form/form.json` → `form/form-<suffix>.json`
fn with_random_suffix(pathname: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(char::from)
        .collect();

    let file_start = pathname.rfind('/').map_or(0, |i| i + 1);
    match pathname[file_start..].rfind('.') {
        Some(dot) => {
            let dot = file_start + dot;
            format!("{}-{}{}", &pathname[..dot], suffix, &pathname[dot..])
        }
        None => format!("{}-{}", pathname, suffix),
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn head(&self, pathname: &str) -> Result<Option<BlobMetadata>, StoreError> {
        let blobs = self.blobs.read().await;
        Ok(blobs.get(pathname).map(|blob| BlobMetadata {
            url: self.url_for(pathname),
            download_url: None,
            pathname: pathname.to_string(),
            size: blob.body.len() as u64,
            uploaded_at: Some(blob.uploaded_at),
            content_type: Some(blob.content_type.clone()),
        }))
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, StoreError> {
        let pathname = self
            .pathname_for(url)
            .ok_or_else(|| StoreError::NotFound(url.to_string()))?;

        let blobs = self.blobs.read().await;
        blobs
            .get(&pathname)
            .map(|blob| blob.body.clone())
            .ok_or(StoreError::Status {
                status: 404,
                message: format!("no blob at {}", url),
            })
    }

    async fn put(
        &self,
        pathname: &str,
        body: Vec<u8>,
        options: PutOptions,
    ) -> Result<PutBlobResult, StoreError> {
        let pathname = if options.add_random_suffix {
            with_random_suffix(pathname)
        } else {
            pathname.to_string()
        };

        let mut blobs = self.blobs.write().await;
        if !options.allow_overwrite && blobs.contains_key(&pathname) {
            return Err(StoreError::AlreadyExists(pathname));
        }

        blobs.insert(
            pathname.clone(),
            StoredBlob {
                body,
                content_type: options.content_type.clone(),
                uploaded_at: Utc::now(),
            },
        );

        Ok(PutBlobResult {
            url: self.url_for(&pathname),
            pathname,
            content_type: Some(options.content_type),
        })
    }
}
