//! HTTP server for Alertmanager webhooks.

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::alertmanager::AlertBatch;
use crate::card;
use crate::config::RelayConfig;
use crate::dispatch::CardDispatcher;

/// Path Alertmanager posts to.
pub const ALERTMANAGER_PATH: &str = "/alertmanager";

/// Body returned for anything other than POST.
pub const ONLY_POST_MESSAGE: &str = "Error: Only accepts POST requests.";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Configuration.
    pub config: Arc<RelayConfig>,
    /// Teams dispatcher.
    pub dispatcher: Arc<CardDispatcher>,
}

impl AppState {
    #[must_use]
    pub fn new(config: RelayConfig, dispatcher: CardDispatcher) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
        }
    }
}

/// Build the HTTP router for the relay.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(ALERTMANAGER_PATH, any(alertmanager_handler))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "cards_sent": state.dispatcher.counter().get(),
    }))
}

/// Handle an Alertmanager webhook.
///
/// The caller only ever sees `400` for a bad request or `200` once the
/// card has been handed to Teams. Delivery failures are logged and do not
/// change the response.
async fn alertmanager_handler(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        warn!(method = %method, "Rejected non-POST request");
        return (StatusCode::BAD_REQUEST, ONLY_POST_MESSAGE).into_response();
    }

    let batch = match AlertBatch::from_slice(&body) {
        Ok(batch) => batch,
        Err(e) => {
            let msg = format!("Error: encoding message: {e}");
            error!(error = %e, "Failed to decode Alertmanager payload");
            return (StatusCode::BAD_REQUEST, msg).into_response();
        }
    };

    info!(
        status = %batch.status,
        receiver = %batch.receiver,
        alerts = batch.alerts.len(),
        "Request received"
    );
    debug!(
        request = %serde_json::to_string(&batch).unwrap_or_default(),
        "Decoded Alertmanager payload"
    );

    let card = card::build(&batch, state.config.markdown_enabled);
    debug!(
        card = %serde_json::to_string(&card).unwrap_or_default(),
        "Created card"
    );

    // Run delivery on its own task so a dropped inbound connection cannot
    // cancel the outbound request.
    let dispatcher = Arc::clone(&state.dispatcher);
    let config = Arc::clone(&state.config);
    let delivery = tokio::spawn(async move {
        if let Err(e) = dispatcher.dispatch(&card, &config.webhook_url).await {
            error!(error = %e, "Failed to deliver card to Teams");
        }
    });

    if let Err(e) = delivery.await {
        error!(error = %e, "Card delivery task failed");
    }

    StatusCode::OK.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::SendCounter;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_router() -> Router {
        // Reserve a port and free it again so any dispatch attempt is refused.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let config = RelayConfig::new(format!("http://{addr}/webhook"));
        let dispatcher = CardDispatcher::with_client(reqwest::Client::new(), SendCounter::new());
        build_router(AppState::new(config, dispatcher))
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_get_is_rejected() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri(ALERTMANAGER_PATH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, ONLY_POST_MESSAGE);
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(ALERTMANAGER_PATH)
                    .body(Body::from("{\"status\":"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_string(response).await;
        assert!(body.starts_with("Error: encoding message: "), "{body}");
    }

    #[tokio::test]
    async fn test_delivery_failure_still_returns_ok() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(ALERTMANAGER_PATH)
                    .body(Body::from(r#"{"status":"firing","alerts":[{}]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_reports_counter() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, json!({ "status": "healthy", "cards_sent": 0 }));
    }
}
