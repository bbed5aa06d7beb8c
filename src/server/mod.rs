//! Recognition HTTP API
//!
//! `POST /calculate` accepts a data-URI snapshot plus the session's variable
//! bindings and responds with an array of recognition results. Every response
//! body has the same array shape, including the 400 and 500 paths, so clients
//! render whatever they receive without an error branch.

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::canvas::strip_data_uri;
use crate::config::{AppConfig, ServerConfig};
use crate::gateway::{RecognitionGateway, RecognitionResult};

/// Shared request state
#[derive(Clone)]
struct AppState {
    gateway: Arc<RecognitionGateway>,
}

/// Body of `POST /calculate`
#[derive(Debug, Deserialize)]
struct CalculateRequest {
    /// Snapshot as a `data:image/png;base64,` URI
    #[serde(default)]
    image: Option<String>,
    /// Current variable bindings from the session
    #[serde(default)]
    dict_of_vars: Option<HashMap<String, String>>,
}

/// Build the application router
pub fn router(gateway: Arc<RecognitionGateway>, server: &ServerConfig) -> Router {
    let state = AppState { gateway };

    let mut router = Router::new()
        .route("/calculate", post(calculate))
        .layer(DefaultBodyLimit::max(server.max_body_bytes()))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state);

    if server.allow_any_origin {
        router = router.layer(CorsLayer::permissive());
    }

    router
}

/// Bind and serve until ctrl-c
pub async fn serve(config: &AppConfig, gateway: Arc<RecognitionGateway>) -> Result<()> {
    let app = router(gateway, &config.server);
    let addr = format!("{}:{}", config.server.bind_addr, config.server.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}

async fn calculate(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<Vec<RecognitionResult>>) {
    let request: CalculateRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected unparseable request body: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(vec![error_item("No image provided")]),
            );
        }
    };

    let image = match request.image.as_deref().filter(|s| !s.is_empty()) {
        Some(image) => image,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(vec![error_item("No image provided")]),
            );
        }
    };

    let payload = strip_data_uri(image);
    let bindings = request.dict_of_vars.unwrap_or_default();

    let results = state.gateway.analyze(payload, &bindings).await;
    (StatusCode::OK, Json(results))
}

/// Convert an uncaught handler panic into the same array shape
fn handle_panic(_err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    warn!("Handler panicked; returning synthetic error array");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(vec![error_item("An unknown error occurred")]),
    )
        .into_response()
}

fn error_item(message: &str) -> RecognitionResult {
    RecognitionResult {
        expr: "Error".to_string(),
        result: message.to_string(),
        assign: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{ModelBackend, ModelError};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use parking_lot::Mutex;
    use tower::ServiceExt;

    /// Stub backend that records what the gateway forwarded
    struct RecordingBackend {
        response: String,
        seen: Arc<Mutex<Option<(String, String)>>>,
    }

    #[async_trait]
    impl ModelBackend for RecordingBackend {
        async fn generate(&self, prompt: &str, png_base64: &str) -> Result<String, ModelError> {
            *self.seen.lock() = Some((prompt.to_string(), png_base64.to_string()));
            Ok(self.response.clone())
        }
    }

    fn test_app(response: &str) -> (Router, Arc<Mutex<Option<(String, String)>>>) {
        let seen = Arc::new(Mutex::new(None));
        let gateway = Arc::new(RecognitionGateway::new(Arc::new(RecordingBackend {
            response: response.to_string(),
            seen: seen.clone(),
        })));
        (router(gateway, &ServerConfig::default()), seen)
    }

    async fn post_calculate(app: Router, body: &str) -> (StatusCode, Vec<RecognitionResult>) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/calculate")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let items: Vec<RecognitionResult> = serde_json::from_slice(&bytes).unwrap();
        (status, items)
    }

    #[tokio::test]
    async fn test_calculate_success() {
        let (app, seen) =
            test_app(r#"[{"expr": "2+2", "result": "4", "assign": false}]"#);

        let body = r#"{"image": "data:image/png;base64,AAAA", "dict_of_vars": {"x": "4"}}"#;
        let (status, items) = post_calculate(app, body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].expr, "2+2");

        // the gateway got the bare payload and the bindings made the prompt
        let (prompt, payload) = seen.lock().clone().unwrap();
        assert_eq!(payload, "AAAA");
        assert!(prompt.contains(r#""x":"4""#));
    }

    #[tokio::test]
    async fn test_missing_image_is_400() {
        let (app, _) = test_app("[]");
        let (status, items) = post_calculate(app, r#"{"dict_of_vars": {}}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].expr, "Error");
        assert_eq!(items[0].result, "No image provided");
        assert!(!items[0].assign);
    }

    #[tokio::test]
    async fn test_empty_image_is_400() {
        let (app, _) = test_app("[]");
        let (status, items) = post_calculate(app, r#"{"image": ""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_body_is_400_with_error_array() {
        let (app, _) = test_app("[]");
        let (status, items) = post_calculate(app, "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].expr, "Error");
    }

    #[tokio::test]
    async fn test_missing_dict_of_vars_defaults_empty() {
        let (app, seen) = test_app(r#"[{"expr": "1", "result": "1"}]"#);
        let (status, _) = post_calculate(app, r#"{"image": "AAAA"}"#).await;

        assert_eq!(status, StatusCode::OK);
        let (prompt, _) = seen.lock().clone().unwrap();
        assert!(prompt.contains("{}"));
    }

    #[tokio::test]
    async fn test_unparseable_model_output_still_200() {
        let (app, _) = test_app("no json here");
        let (status, items) =
            post_calculate(app, r#"{"image": "data:image/png;base64,AAAA"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].expr, "Error processing image");
        assert_eq!(items[0].result, "Could not analyze the image");
    }
}
