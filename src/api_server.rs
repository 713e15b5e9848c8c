// Axum API Server Module
//
// Purpose: single JSON endpoint persisting the form document in a blob store
//   GET  /api/form  -> current document (empty when nothing stored or unreadable)
//   POST /api/form  -> normalize body, overwrite stored document
//   any other method -> 405

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};

use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use serde::Serialize;
use std::sync::Arc;

use crate::auth::{BearerToken, OpenAccess, WriteGuard};
use crate::body::decode_body;
use crate::config::{BlobBackend, ServerConfig};
use crate::normalizer::normalize;
use crate::store::{BlobStore, FormStore, MemoryBlobStore, StoreError, VercelBlobStore};
use crate::utils::is_truthy;

pub const FORM_ROUTE: &str = "/api/form";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub forms: FormStore,
    pub write_guard: Arc<dyn WriteGuard>,
}

impl AppState {
    pub fn new(blobs: Arc<dyn BlobStore>, pathname: &str, write_guard: Arc<dyn WriteGuard>) -> Self {
        Self {
            forms: FormStore::new(blobs, pathname),
            write_guard,
        }
    }

    /// Open-access state over an arbitrary blob store at the default pathname.
    pub fn with_store(blobs: Arc<dyn BlobStore>) -> Self {
        Self::new(blobs, crate::document::DEFAULT_FORM_PATHNAME, Arc::new(OpenAccess))
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, StoreError> {
        let blobs: Arc<dyn BlobStore> = match config.blob_backend {
            BlobBackend::Vercel => {
                let token = config.blob_token.as_deref().unwrap_or_default();
                tracing::info!("Using Vercel Blob store at {}", config.blob_api_url);
                Arc::new(VercelBlobStore::new(token, &config.blob_api_url)?)
            }
            BlobBackend::Memory => {
                tracing::warn!("Using in-memory blob store; the form is lost on restart");
                Arc::new(MemoryBlobStore::new(&config.memory_base_url))
            }
        };

        let write_guard: Arc<dyn WriteGuard> = match &config.write_token {
            Some(token) => {
                tracing::info!("Form writes require a bearer token");
                Arc::new(BearerToken::new(token.clone()))
            }
            None => {
                tracing::warn!("Form writes are open to anyone who can reach the endpoint");
                Arc::new(OpenAccess)
            }
        };

        Ok(Self::new(blobs, &config.form_pathname, write_guard))
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Form endpoint: method dispatch happens in the handler
        .route(FORM_ROUTE, any(dispatch))

        // Middleware (applied in reverse order)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(TraceLayer::new_for_http()) // Request logging
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Routes strictly on method. Anything but GET and POST, HEAD included, is 405.
async fn dispatch(State(state): State<AppState>, request: Request) -> Result<Response, AppError> {
    let method = request.method().clone();
    match method {
        Method::GET => Ok(read_form(&state).await),
        Method::POST => write_form(&state, request).await,
        _ => Err(AppError::MethodNotAllowed),
    }
}

async fn read_form(state: &AppState) -> Response {
    let doc = state.forms.load_document().await;
    tracing::debug!("Serving form with {} sections", doc.sections.len());
    send_json(StatusCode::OK, &doc)
}

async fn write_form(state: &AppState, request: Request) -> Result<Response, AppError> {
    if !state.write_guard.authorize(request.headers()) {
        tracing::warn!("Rejected unauthorized form write");
        return Err(AppError::Unauthorized);
    }

    // null, false, 0 and "" bodies are treated like an undecodable body
    let body = decode_body(request)
        .await
        .filter(is_truthy)
        .ok_or(AppError::InvalidJson)?;

    let cleaned = normalize(&body);
    let url = state.forms.save_document(&cleaned).await?;

    Ok(send_json(StatusCode::OK, &WriteAck { ok: true, url }))
}

#[derive(Debug, Serialize)]
struct WriteAck {
    ok: bool,
    url: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    ok: bool,
    message: &'a str,
}

/// Serializes `data` with an explicit UTF-8 JSON content type.
fn send_json<T: Serialize>(status: StatusCode, data: &T) -> Response {
    match serde_json::to_vec(data) {
        Ok(body) => (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("failed to store form: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidJson => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Store(e) => {
                tracing::error!("Form write failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = self.to_string();
        send_json(status, &ErrorEnvelope { ok: false, message: &message })
    }
}
