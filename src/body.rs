//! Request body decoding
//!
//! A write request's JSON can arrive two ways: already parsed by an upstream
//! layer (attached as a `ParsedBody` extension) or as a raw byte stream. The
//! decoder picks the adapter by looking at the request, so both hosts share
//! the same write path.

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use serde_json::Value;

/// A body that an upstream layer has already parsed.
///
/// Only objects and arrays are taken as is; any other value falls through to
/// reading the raw stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody(pub Value);

/// Where a request's JSON comes from.
#[derive(Debug)]
pub enum BodySource {
    Parsed(Value),
    Raw(Body),
}

impl BodySource {
    pub fn from_request(mut request: Request) -> Self {
        match request.extensions_mut().remove::<ParsedBody>() {
            Some(ParsedBody(value)) if value.is_object() || value.is_array() => {
                BodySource::Parsed(value)
            }
            _ => BodySource::Raw(request.into_body()),
        }
    }

    /// Decoded JSON, or `None` when the body is empty, unreadable or not JSON.
    pub async fn decode(self) -> Option<Value> {
        match self {
            BodySource::Parsed(value) => Some(value),
            BodySource::Raw(body) => match to_bytes(body, usize::MAX).await {
                Ok(bytes) => parse_raw(&bytes),
                Err(e) => {
                    tracing::warn!("Failed to read request body: {}", e);
                    None
                }
            },
        }
    }
}

/// Decode a request's JSON body.
pub async fn decode_body(request: Request) -> Option<Value> {
    BodySource::from_request(request).decode().await
}

/// UTF-8 (lossy) then JSON. Empty input and parse errors both yield `None`.
pub fn parse_raw(bytes: &[u8]) -> Option<Value> {
    let text = String::from_utf8_lossy(bytes);
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Request body is not JSON: {}", e);
            None
        }
    }
}
