use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use circa_application::SessionManager;
use circa_core::config::ServerConfig;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::handlers::{
    circuit::{generate_circuit, validate_circuit},
    health::health,
    session::{process_response, session_status, start_session},
};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }
}

/// Builds the router. Every route is served at the root and under `/api`.
pub fn app_router(state: AppState, allowed_origins: &[String]) -> Router {
    let routes = Router::new()
        .route("/session/start", post(start_session))
        .route("/session/respond", post(process_response))
        .route("/session/status", get(session_status))
        .route("/circuit/generate", post(generate_circuit))
        .route("/circuit/validate", post(validate_circuit));

    Router::new()
        .route("/", get(health))
        .merge(routes.clone())
        .nest("/api", routes)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Binds `config.bind` and serves until Ctrl-C.
pub async fn serve(state: AppState, config: &ServerConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app_router(state, &config.allowed_origins))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
}
