//! HTTP surface: `POST /route`, `GET /ui`, `GET /health`

use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;
use crate::error::{RouteError, ValidationError};
use crate::request::{QualityTier, RouteRequestBody, RoutingRequest};
use crate::router::PromptRouter;
use crate::ui;

/// Token budget used for prompts submitted through the HTML form
pub const UI_MAX_TOKENS: u32 = 500;

pub type SharedRouter = Arc<PromptRouter>;

/// Build the axum app around an already-configured router
pub fn build_app(router: SharedRouter, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/route", post(route_handler))
        .route("/ui", get(ui_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .with_state(router)
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: &ServerConfig, router: SharedRouter) -> Result<()> {
    let addr = config.addr();
    let app = build_app(router, config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("LLM router listening on http://{}", addr);
    info!("Ask from a browser at http://{}/ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn route_handler(
    State(router): State<SharedRouter>,
    payload: Result<Json<RouteRequestBody>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(body)) => body.validate(),
        Err(rejection) => Err(ValidationError::new(rejection.body_text())),
    };

    let request = match request {
        Ok(request) => request,
        Err(err) => return RouteError::from(err).into_response(),
    };

    match router.route(&request).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => err.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct UiQuery {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    quality: Option<String>,
}

async fn ui_handler(State(router): State<SharedRouter>, Query(query): Query<UiQuery>) -> Html<String> {
    let q = query.q.as_deref().unwrap_or_default().trim();
    if q.is_empty() {
        return Html(ui::render_form());
    }

    let tier = query
        .quality
        .as_deref()
        .map(QualityTier::from_label_lenient)
        .unwrap_or_default();

    let result = match RoutingRequest::new(q, tier, UI_MAX_TOKENS) {
        Ok(request) => router.route(&request).await,
        Err(err) => Err(err.into()),
    };

    match result {
        Ok(outcome) => Html(ui::render_outcome(q, &outcome)),
        Err(err) => Html(ui::render_error(q, &err.to_string())),
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = match &self {
            RouteError::Validation(_) => StatusCode::BAD_REQUEST,
            err if err.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        };

        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{Backend, FAST_DEADLINE, QUALITY_DEADLINE};
    use axum::body::Body;
    use axum::http::Request;
    use llm_client::{LlmError, MockProvider};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app_with(fast: MockProvider, quality: MockProvider) -> Router {
        let router = PromptRouter::new(
            Backend::new("groq", Arc::new(fast), FAST_DEADLINE),
            Backend::new("openai", Arc::new(quality), QUALITY_DEADLINE),
        );
        build_app(Arc::new(router), 1024 * 1024)
    }

    fn healthy_app() -> Router {
        app_with(
            MockProvider::always_succeeds("4"),
            MockProvider::always_succeeds("four"),
        )
    }

    fn network_error() -> LlmError {
        LlmError::ApiError {
            message: "Request failed: connection refused".to_string(),
            status_code: None,
        }
    }

    async fn post_route(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/route")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1_000_000)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1_000_000)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_route_free_primary_success() {
        let (status, json) = post_route(healthy_app(), r#"{"prompt":"2+2?"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["provider_used"], "groq");
        assert_eq!(json["answer"], "4");
        assert!(json["latency_ms"].is_u64());
        assert!(json.get("fallback_from").is_none());
        assert!(json.get("error_from_primary").is_none());
    }

    #[tokio::test]
    async fn test_route_free_fallback_reports_provenance() {
        let app = app_with(
            MockProvider::always_fails(network_error()),
            MockProvider::always_succeeds("4"),
        );
        let (status, json) = post_route(app, r#"{"prompt":"2+2?","quality":"free"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["provider_used"], "openai");
        assert_eq!(json["fallback_from"], "groq");
        assert_eq!(
            json["error_from_primary"],
            "API error: Request failed: connection refused"
        );
    }

    #[tokio::test]
    async fn test_route_best_uses_quality_backend() {
        let (status, json) =
            post_route(healthy_app(), r#"{"prompt":"2+2?","quality":"best","max_tokens":64}"#)
                .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["provider_used"], "openai");
        assert_eq!(json["answer"], "four");
    }

    #[tokio::test]
    async fn test_route_cheap_failure_is_bad_gateway() {
        let app = app_with(
            MockProvider::always_fails(network_error()),
            MockProvider::always_succeeds("4"),
        );
        let (status, json) = post_route(app, r#"{"prompt":"2+2?","quality":"cheap"}"#).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["error"].as_str().unwrap().contains("groq"));
        assert!(json.get("provider_used").is_none());
    }

    #[tokio::test]
    async fn test_route_both_failing_is_bad_gateway() {
        let app = app_with(
            MockProvider::always_fails(network_error()),
            MockProvider::always_fails(network_error()),
        );
        let (status, json) = post_route(app, r#"{"prompt":"2+2?"}"#).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["error"].as_str().unwrap().starts_with("All backends failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_route_best_timeout_is_gateway_timeout() {
        let app = app_with(
            MockProvider::always_succeeds("4"),
            MockProvider::always_succeeds("late").with_delay(Duration::from_secs(60)),
        );
        let (status, json) = post_route(app, r#"{"prompt":"2+2?","quality":"best"}"#).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert!(json["error"].as_str().unwrap().contains("timeout after 20s"));
    }

    #[tokio::test]
    async fn test_route_validation_errors() {
        for body in [
            r#"{"prompt":""}"#,
            r#"{"prompt":"2+2?","max_tokens":10000}"#,
            r#"{"prompt":"2+2?","max_tokens":8}"#,
            r#"{"prompt":"2+2?","quality":"premium"}"#,
            r#"{"prompt":42}"#,
            r#"{"prompt":"2+2?","quality":null}"#,
            r#"{"prompt":"2+2?","max_tokens":null}"#,
            r#"{}"#,
            "not json",
        ] {
            let (status, json) = post_route(healthy_app(), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert!(json["error"].is_string(), "body: {body}");
        }
    }

    #[tokio::test]
    async fn test_route_whitespace_prompt_is_routed() {
        let (status, json) = post_route(healthy_app(), r#"{"prompt":" "}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["provider_used"], "groq");
    }

    #[tokio::test]
    async fn test_validation_happens_before_routing() {
        let fast = Arc::new(MockProvider::always_succeeds("4"));
        let quality = Arc::new(MockProvider::always_succeeds("four"));
        let router = PromptRouter::new(
            Backend::new("groq", fast.clone(), FAST_DEADLINE),
            Backend::new("openai", quality.clone(), QUALITY_DEADLINE),
        );
        let app = build_app(Arc::new(router), 1024 * 1024);

        let (status, _) = post_route(app, r#"{"prompt":""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(fast.call_count(), 0);
        assert_eq!(quality.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ui_without_query_renders_form() {
        let (status, html) = get_text(healthy_app(), "/ui").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Ask something..."));
        assert!(!html.contains("Provider:"));
    }

    #[tokio::test]
    async fn test_ui_with_query_renders_answer() {
        let (status, html) = get_text(healthy_app(), "/ui?q=2%2B2%3F").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"value="2+2?""#));
        assert!(html.contains("Provider: <b>groq</b>"));
        assert!(html.contains(">4</pre>"));
    }

    #[tokio::test]
    async fn test_ui_escapes_query_and_answer() {
        let app = app_with(
            MockProvider::always_succeeds("<script>alert(1)</script>"),
            MockProvider::always_succeeds("four"),
        );
        let (_, html) = get_text(app, "/ui?q=%3Cscript%3E").await;
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains(r#"value="&lt;script&gt;""#));
    }

    #[tokio::test]
    async fn test_ui_unknown_quality_gets_free_plan() {
        let (_, html) = get_text(healthy_app(), "/ui?q=hi&quality=platinum").await;
        assert!(html.contains("Provider: <b>groq</b>"));

        let (_, html) = get_text(healthy_app(), "/ui?q=hi&quality=best").await;
        assert!(html.contains("Provider: <b>openai</b>"));
    }

    #[tokio::test]
    async fn test_ui_renders_routing_failure() {
        let app = app_with(
            MockProvider::always_fails(network_error()),
            MockProvider::always_fails(network_error()),
        );
        let (status, html) = get_text(app, "/ui?q=hi").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Error: All backends failed"));
    }

    #[tokio::test]
    async fn test_health() {
        let response = healthy_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
