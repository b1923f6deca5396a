//! HTTP surface: serves the static site the shell runs in, plus the news proxy that keeps
//! the upstream API key off the client.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span, error, info, warn};

use crate::AppState;

/// Query the client-side news page relies on; the key is appended server-side.
const NEWS_QUERY: [(&str, &str); 4] = [
    ("category", "general"),
    ("lang", "en"),
    ("country", "us"),
    ("max", "10"),
];

/// create_router
///
/// `/health`, `/api/news`, and the static site with an `index.html` fallback so deep
/// links like `/#/events` and unknown paths still boot the shell.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let public_dir = state.config.public_dir.clone();
    let site = ServeDir::new(&public_dir).fallback(ServeFile::new(public_dir.join("index.html")));

    Router::new()
        .route("/health", get(health))
        .route("/api/news", get(news_proxy))
        .fallback_service(site)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

async fn health() -> &'static str {
    "ok"
}

fn proxy_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// news_proxy
///
/// Forwards to the configured upstream with the server-held key and returns its JSON
/// unchanged. 503 when no key is configured, 502 when the upstream fails.
async fn news_proxy(State(state): State<AppState>) -> Response {
    let Some(key) = state.config.news_api_key.as_deref() else {
        warn!("news requested but no NEWS_API_KEY is configured");
        return proxy_error(StatusCode::SERVICE_UNAVAILABLE, "news service unavailable");
    };

    let response = match state
        .http
        .get(&state.config.news_api_url)
        .query(&NEWS_QUERY)
        .query(&[("apikey", key)])
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "news upstream unreachable");
            return proxy_error(StatusCode::BAD_GATEWAY, "news upstream unreachable");
        }
    };

    let status = response.status();
    if !status.is_success() {
        error!(status = status.as_u16(), "news upstream returned an error");
        return proxy_error(StatusCode::BAD_GATEWAY, "news upstream returned an error");
    }

    match response.json::<Value>().await {
        Ok(body) => {
            info!("news proxied");
            Json(body).into_response()
        }
        Err(e) => {
            error!(error = %e, "news upstream returned invalid JSON");
            proxy_error(StatusCode::BAD_GATEWAY, "news upstream returned invalid JSON")
        }
    }
}

/// trace_span_logger
///
/// Span for every request, tagged with the generated `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
