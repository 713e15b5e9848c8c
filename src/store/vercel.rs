//! Vercel Blob backend
//!
//! Talks to the Vercel Blob HTTP API directly:
//!   - head:  GET  {api}/?url={pathname}
//!   - put:   PUT  {api}/{pathname}
//!   - fetch: GET  {public url}
//!
//! Authentication is a read-write token sent as a bearer header.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CACHE_CONTROL};
use reqwest::{Client, StatusCode};

use super::{BlobMetadata, BlobStore, PutBlobResult, PutOptions, StoreError};

pub use crate::config::DEFAULT_BLOB_API_URL as DEFAULT_API_URL;
const API_VERSION: &str = "7";

#[derive(Clone)]
pub struct VercelBlobStore {
    client: Client,
    api_url: String,
    token: String,
}

impl std::fmt::Debug for VercelBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VercelBlobStore")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl VercelBlobStore {
    pub fn new(token: &str, api_url: &str) -> Result<Self, StoreError> {
        if token.trim().is_empty() {
            return Err(StoreError::Config("blob read-write token is empty".to_string()));
        }
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn api_headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|e| StoreError::Config(format!("token is not a valid header value: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            HeaderName::from_static("x-api-version"),
            HeaderValue::from_static(API_VERSION),
        );
        Ok(headers)
    }
}

/// Upload headers describing `options`.
fn put_headers(options: &PutOptions) -> Result<HeaderMap, StoreError> {
    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(&options.content_type)
        .map_err(|e| StoreError::Config(format!("invalid content type: {}", e)))?;
    headers.insert(HeaderName::from_static("x-content-type"), content_type);
    headers.insert(
        HeaderName::from_static("x-add-random-suffix"),
        HeaderValue::from_static(if options.add_random_suffix { "1" } else { "0" }),
    );
    headers.insert(
        HeaderName::from_static("x-allow-overwrite"),
        HeaderValue::from_static(if options.allow_overwrite { "1" } else { "0" }),
    );
    Ok(headers)
}

async fn status_error(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    StoreError::Status { status, message }
}

#[async_trait]
impl BlobStore for VercelBlobStore {
    async fn head(&self, pathname: &str) -> Result<Option<BlobMetadata>, StoreError> {
        let response = self
            .client
            .get(format!("{}/", self.api_url))
            .query(&[("url", pathname)])
            .headers(self.api_headers()?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(Some(response.json::<BlobMetadata>().await?))
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, StoreError> {
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn put(
        &self,
        pathname: &str,
        body: Vec<u8>,
        options: PutOptions,
    ) -> Result<PutBlobResult, StoreError> {
        let mut headers = self.api_headers()?;
        headers.extend(put_headers(&options)?);

        let response = self
            .client
            .put(format!("{}/{}", self.api_url, pathname))
            .headers(headers)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json::<PutBlobResult>().await?)
    }
}
