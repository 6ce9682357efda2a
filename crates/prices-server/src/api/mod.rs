pub mod response;

use crate::config::Config;
use crate::db;
use crate::features;
use crate::ingest::ImportPipeline;
use crate::middleware;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;

/// Build the full application: service endpoints, `/api/v0` features and the middleware stack
pub fn create_router(pool: PgPool, config: &Config) -> Router {
    let feature_state = features::FeatureState {
        pipeline: ImportPipeline::new(pool.clone(), config.import.clone()),
    };

    let api_v0 = features::router(feature_state);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(pool)
        .nest("/api/v0", api_v0)
        // Innermost first
        .layer(DefaultBodyLimit::max(config.import.max_upload_bytes))
        .layer(middleware::timeout_layer(config.server.request_timeout_secs))
        .layer(middleware::cors_layer(&config.cors))
        .layer(middleware::tracing_layer())
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Prices Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn health(State(pool): State<PgPool>) -> Result<Response, StatusCode> {
    match db::health_check(&pool).await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}
