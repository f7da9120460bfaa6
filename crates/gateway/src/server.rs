use std::net::SocketAddr;

use {
    axum::{
        Json, Router,
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post},
    },
    tower_http::cors::{Any, CorsLayer},
    tracing::info,
};

use crate::{dm::dm_handler, state::AppState};

/// Build the gateway router (shared between production startup and tests).
pub fn build_gateway_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/dm", post(dm_handler).options(preflight_handler))
        .layer(cors)
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Browser preflights are answered by the CORS layer before reaching here;
/// a plain OPTIONS still gets an empty 200 with no body validation.
async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

/// Bind and serve until shutdown. The listen address comes from the server
/// section of the config carried in `state`.
pub async fn run_gateway(state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr =
        format!("{}:{}", state.config.server.bind, state.config.server.port).parse()?;
    let app = build_gateway_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "petrel gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}
