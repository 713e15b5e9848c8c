//! Form document persistence
//!
//! One document lives at one fixed pathname. Reads never fail: a missing
//! blob, a lookup or fetch error, or unparseable content all read as the
//! empty document. Writes overwrite unconditionally and propagate errors.

use std::sync::Arc;

use serde_json::Value;

use super::{BlobStore, PutOptions, StoreError};
use crate::document::FormDocument;
pub use crate::document::DEFAULT_FORM_PATHNAME;
use crate::normalizer::normalize;

#[derive(Clone)]
pub struct FormStore {
    blobs: Arc<dyn BlobStore>,
    pathname: String,
}

impl FormStore {
    pub fn new(blobs: Arc<dyn BlobStore>, pathname: impl Into<String>) -> Self {
        Self {
            blobs,
            pathname: pathname.into(),
        }
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// Current document, normalized. Falls back to the empty document on any failure.
    pub async fn load_document(&self) -> FormDocument {
        match self.load_raw().await {
            Ok(Some(value)) => normalize(&value),
            Ok(None) => {
                tracing::debug!("No form stored at {} yet", self.pathname);
                FormDocument::empty()
            }
            Err(e) => {
                tracing::warn!("Serving empty form, could not read {}: {}", self.pathname, e);
                FormDocument::empty()
            }
        }
    }

    async fn load_raw(&self) -> Result<Option<Value>, LoadError> {
        let Some(meta) = self.blobs.head(&self.pathname).await? else {
            return Ok(None);
        };
        let bytes = self.blobs.fetch(&meta.url).await?;
        let value = serde_json::from_slice(&bytes)?;
        Ok(Some(value))
    }

    /// Store `doc` at the fixed pathname, replacing whatever is there.
    ///
    /// Returns the public URL of the stored blob.
    pub async fn save_document(&self, doc: &FormDocument) -> Result<String, StoreError> {
        let body = serde_json::to_vec(doc)?;
        let size = body.len();
        let result = self
            .blobs
            .put(&self.pathname, body, PutOptions::json_overwrite())
            .await?;

        tracing::info!(
            "Saved form ({} sections, {} bytes) to {}",
            doc.sections.len(),
            size,
            result.url
        );
        Ok(result.url)
    }
}

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("stored form is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
