//! HTTP surface for the memoir memory layer.
//!
//! Endpoints:
//! - `POST /api/chat` — run one memory-grounded chat turn
//! - `POST /api/ingest` — bulk-seed memories without generation
//! - `GET /api/health` — liveness probe
//!
//! Requests pass per-IP rate limiting and CORS before reaching the
//! pipeline. Validation failures answer 422, rate-limited clients 429,
//! pipeline failures a generic 502.

pub mod rate_limit;
pub mod routes;
pub mod state;

pub use rate_limit::RateLimiter;
pub use state::AppState;

use axum::http::HeaderValue;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Assemble the router with rate limiting and CORS applied.
pub fn create_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let cors = cors_layer(cors_origins);

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/chat", post(routes::chat))
        .route("/api/ingest", post(routes::ingest))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::enforce,
        ))
        .layer(cors)
        .with_state(state)
}

/// CORS restricted to the configured origins; `*` opens it up.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("dropping unparseable CORS origin (origin={origin})");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Bind and serve until shutdown.
pub async fn serve(
    state: Arc<AppState>,
    addr: SocketAddr,
    cors_origins: &[String],
) -> anyhow::Result<()> {
    let router = create_router(state, cors_origins);
    info!("starting memoir server (addr={addr})");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::cors_layer;

    #[test]
    fn unparseable_origins_are_dropped_not_fatal() {
        // Header values reject control characters; the layer must build
        // anyway from whatever origins survive parsing.
        let origins = vec![
            "http://ok.test".to_string(),
            "http://bad\norigin".to_string(),
        ];
        let _ = cors_layer(&origins);
    }

    #[test]
    fn wildcard_origin_opens_cors_up() {
        let origins = vec!["*".to_string()];
        let _ = cors_layer(&origins);
    }
}
