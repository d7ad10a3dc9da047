//! Route definitions and router construction.

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig, OUTPUTS_ROUTE};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Job API routes, state not yet applied.
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", post(handlers::jobs::create))
        .route("/jobs/{id}", get(handlers::jobs::get))
        .route(
            "/jobs/{id}/chunks/{index}",
            get(handlers::jobs::chunk_status),
        )
        .route(
            "/jobs/{id}/chunks/{index}/fetch",
            post(handlers::jobs::fetch_chunk),
        )
        .route("/health", get(handlers::system::health))
}

/// Create the main application router.
///
/// Artifacts are served straight from the job manager's output directory.
pub fn create_router(ctx: AxumContext, cors: &CorsConfig) -> Router {
    let outputs = ServeDir::new(ctx.jobs.artifacts().root());
    let state: AppState = Arc::new(ctx);

    api_routes()
        .nest_service(OUTPUTS_ROUTE, outputs)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors))
}
