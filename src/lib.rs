//! Form State API
//!
//! A single JSON endpoint that stores one form definition document
//! (sections → questions → options → sub-options) in a blob store.
//!
//! Module layout:
//! - `document`: the form document model
//! - `normalizer` + `utils/`: best-effort coercion of untrusted JSON into that model
//! - `body`: request body decoding (pre-parsed or raw stream)
//! - `store/`: blob store backends and the form load/save protocol
//! - `auth`: pluggable write guard
//! - `api_server`: axum router, method dispatch and error responses
//! - `config`: environment configuration

pub mod config;
pub mod document;
pub mod normalizer;
pub mod utils;

#[cfg(feature = "api")]
pub mod api_server;
#[cfg(feature = "api")]
pub mod auth;
#[cfg(feature = "api")]
pub mod body;
#[cfg(feature = "api")]
pub mod store;

// Re-export commonly used types
pub use config::{BlobBackend, ConfigError, ServerConfig};
pub use document::{FormDocument, Question, QuestionOption, Section, SubOption};
pub use normalizer::normalize;

#[cfg(feature = "api")]
pub use api_server::{create_router, AppError, AppState, FORM_ROUTE};
#[cfg(feature = "api")]
pub use body::ParsedBody;
#[cfg(feature = "api")]
pub use store::{BlobStore, FormStore, MemoryBlobStore, StoreError, VercelBlobStore};
