use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Extension, Router};
use leadgate_core::signature::SignatureConfig;
use leadgate_core::sync::SyncEngine;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::routes;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SyncEngine>,
    pub signature: SignatureConfig,
    pub max_payload_bytes: usize,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        engine: Arc<SyncEngine>,
        signature: SignatureConfig,
        max_payload_bytes: usize,
    ) -> Self {
        Self {
            engine,
            signature,
            max_payload_bytes,
            started_at: Instant::now(),
        }
    }
}

#[tracing::instrument(level = "debug", skip_all)]
pub fn router(state: AppState) -> Router {
    let max_payload_bytes = state.max_payload_bytes;
    let state = Arc::new(state);

    Router::new()
        .merge(routes::router())
        .route("/health", get(routes::health::get_health))
        .layer(DefaultBodyLimit::max(max_payload_bytes.max(1)))
        .layer(Extension(state))
        .layer(SetRequestIdLayer::new(
            axum::http::HeaderName::from_static("x-request-id"),
            MakeRequestUuid,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[tracing::instrument(level = "info", skip_all)]
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "leadgate listening");
    axum::serve(listener, app).await?;
    Ok(())
}
