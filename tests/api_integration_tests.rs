// API Integration Tests
//
// Purpose: drive the form endpoint end to end through the router
// Run with: cargo test --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use form_state_api::auth::BearerToken;
    use form_state_api::store::{BlobMetadata, PutBlobResult, PutOptions};
    use form_state_api::{
        create_router, AppState, BlobStore, MemoryBlobStore, ParsedBody, StoreError, FORM_ROUTE,
    };
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt; // for oneshot

    // Helper: fresh app over an empty in-memory store
    fn create_test_app() -> (axum::Router, Arc<MemoryBlobStore>) {
        let blobs = Arc::new(MemoryBlobStore::default());
        let app = create_router(AppState::with_store(blobs.clone()));
        (app, blobs)
    }

    fn form_request(method: &str, body: Body) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(FORM_ROUTE)
            .body(body)
            .unwrap()
    }

    // Helper: Parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    fn assert_no_store(response: &axum::response::Response) {
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
            Some("no-store")
        );
    }

    fn assert_json_content_type(response: &axum::response::Response) {
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("application/json; charset=utf-8")
        );
    }

    /// Blob store whose reads see nothing and whose writes always fail.
    struct FailingStore;

    #[async_trait]
    impl BlobStore for FailingStore {
        async fn head(&self, _pathname: &str) -> Result<Option<BlobMetadata>, StoreError> {
            Err(StoreError::Status { status: 503, message: "down".into() })
        }

        async fn fetch(&self, url: &str) -> Result<Vec<u8>, StoreError> {
            Err(StoreError::NotFound(url.to_string()))
        }

        async fn put(
            &self,
            _pathname: &str,
            _body: Vec<u8>,
            _options: PutOptions,
        ) -> Result<PutBlobResult, StoreError> {
            Err(StoreError::Status { status: 503, message: "down".into() })
        }
    }

    // =========================================================================
    // Section 1: Read path
    // =========================================================================

    #[tokio::test]
    async fn test_get_before_any_write() {
        let (app, _) = create_test_app();

        let response = app.oneshot(form_request("GET", Body::empty())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_no_store(&response);
        assert_json_content_type(&response);
        assert_eq!(json_response(response).await, json!({"sections": []}));
    }

    #[tokio::test]
    async fn test_get_with_unreachable_store() {
        let app = create_router(AppState::with_store(Arc::new(FailingStore)));

        let response = app.oneshot(form_request("GET", Body::empty())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_response(response).await, json!({"sections": []}));
    }

    #[tokio::test]
    async fn test_get_normalizes_stored_junk() {
        let (app, blobs) = create_test_app();
        blobs
            .put(
                "form/form.json",
                br#"{"sections":[{"id":5,"questions":[{"required":1,"extra":true}]}],"v":2}"#.to_vec(),
                PutOptions::json_overwrite(),
            )
            .await
            .unwrap();

        let response = app.oneshot(form_request("GET", Body::empty())).await.unwrap();

        assert_eq!(json_response(response).await, json!({"sections": [{
            "id": "5",
            "title": "",
            "questions": [{"id": "", "type": "text", "label": "", "required": true, "options": []}]
        }]}));
    }

    // =========================================================================
    // Section 2: Write path
    // =========================================================================

    #[tokio::test]
    async fn test_post_then_get() {
        let (app, _) = create_test_app();
        let body = r#"{"sections":[{"id":"s1","title":"T","questions":[]}]}"#;

        let response = app
            .clone()
            .oneshot(form_request("POST", Body::from(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_no_store(&response);
        assert_json_content_type(&response);
        let ack = json_response(response).await;
        assert_eq!(ack["ok"], true);
        assert_eq!(ack["url"], "memory://blob/form/form.json");

        let response = app.oneshot(form_request("GET", Body::empty())).await.unwrap();
        assert_eq!(
            json_response(response).await,
            json!({"sections": [{"id": "s1", "title": "T", "questions": []}]})
        );
    }

    #[tokio::test]
    async fn test_post_stores_normalized_document() {
        let (app, blobs) = create_test_app();
        let body = json!({
            "sections": [
                {"id": "b", "questions": [{"options": [{"text": "x"}]}]},
                {"id": "a", "secret": "dropped"}
            ],
            "password": "ignored"
        });

        let response = app
            .oneshot(form_request("POST", Body::from(body.to_string())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let stored = blobs.fetch("memory://blob/form/form.json").await.unwrap();
        let stored: Value = serde_json::from_slice(&stored).unwrap();
        assert_eq!(stored, json!({"sections": [
            {"id": "b", "title": "", "questions": [{
                "id": "", "type": "text", "label": "", "required": false,
                "options": [{"id": "", "text": "x", "followUp": "none", "subOptions": []}]
            }]},
            {"id": "a", "title": "", "questions": []}
        ]}));
    }

    #[tokio::test]
    async fn test_post_last_write_wins() {
        let (app, blobs) = create_test_app();

        for title in ["first", "second"] {
            let body = json!({"sections": [{"id": "s", "title": title}]}).to_string();
            let response = app
                .clone()
                .oneshot(form_request("POST", Body::from(body)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert_eq!(blobs.len().await, 1);
        let response = app.oneshot(form_request("GET", Body::empty())).await.unwrap();
        assert_eq!(json_response(response).await["sections"][0]["title"], "second");
    }

    #[tokio::test]
    async fn test_post_coercible_non_document_stores_empty() {
        let (app, _) = create_test_app();

        let response = app
            .clone()
            .oneshot(form_request("POST", Body::from("[1, 2, 3]")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(form_request("GET", Body::empty())).await.unwrap();
        assert_eq!(json_response(response).await, json!({"sections": []}));
    }

    #[tokio::test]
    async fn test_post_pre_parsed_body() {
        let (app, _) = create_test_app();
        let mut request = form_request("POST", Body::empty());
        request
            .extensions_mut()
            .insert(ParsedBody(json!({"sections": [{"id": "pre"}]})));

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(form_request("GET", Body::empty())).await.unwrap();
        assert_eq!(json_response(response).await["sections"][0]["id"], "pre");
    }

    // =========================================================================
    // Section 3: Error responses
    // =========================================================================

    #[tokio::test]
    async fn test_post_invalid_json() {
        let (app, blobs) = create_test_app();

        let response = app
            .oneshot(form_request("POST", Body::from("{not json")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_no_store(&response);
        assert_json_content_type(&response);
        assert_eq!(json_response(response).await, json!({"ok": false, "message": "Invalid JSON"}));
        assert!(blobs.is_empty().await);
    }

    #[tokio::test]
    async fn test_post_empty_and_falsy_bodies() {
        for body in ["", "null", "false", "0", "\"\""] {
            let (app, _) = create_test_app();
            let response = app
                .oneshot(form_request("POST", Body::from(body)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {:?}", body);
        }
    }

    #[tokio::test]
    async fn test_unsupported_methods() {
        for method in ["PUT", "DELETE", "PATCH", "OPTIONS", "HEAD"] {
            let (app, _) = create_test_app();
            let response = app
                .oneshot(form_request(method, Body::empty()))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "method {}", method);
            assert_no_store(&response);
            if method != "HEAD" {
                assert_eq!(
                    json_response(response).await,
                    json!({"ok": false, "message": "Method Not Allowed"})
                );
            }
        }
    }

    #[tokio::test]
    async fn test_store_write_failure() {
        let app = create_router(AppState::with_store(Arc::new(FailingStore)));

        let response = app
            .oneshot(form_request("POST", Body::from(r#"{"sections":[]}"#)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_no_store(&response);
        let body = json_response(response).await;
        assert_eq!(body["ok"], false);
        assert!(body["message"].as_str().unwrap().contains("503"));
    }

    // =========================================================================
    // Section 4: Write guard
    // =========================================================================

    fn guarded_app() -> axum::Router {
        let state = AppState::new(
            Arc::new(MemoryBlobStore::default()),
            "form/form.json",
            Arc::new(BearerToken::new("letmein")),
        );
        create_router(state)
    }

    #[tokio::test]
    async fn test_guarded_write_without_token() {
        let response = guarded_app()
            .oneshot(form_request("POST", Body::from(r#"{"sections":[]}"#)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_no_store(&response);
        assert_eq!(json_response(response).await, json!({"ok": false, "message": "Unauthorized"}));
    }

    #[tokio::test]
    async fn test_guarded_write_with_token_and_public_read() {
        let app = guarded_app();
        let request = Request::builder()
            .method("POST")
            .uri(FORM_ROUTE)
            .header(header::AUTHORIZATION, "Bearer letmein")
            .body(Body::from(r#"{"sections":[{"id":"s1"}]}"#))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(form_request("GET", Body::empty())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_response(response).await["sections"][0]["id"], "s1");
    }

    // =========================================================================
    // Section 5: Health
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_no_store(&response);
        let body = json_response(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }
}
