//! Feature slices of the prices API
//!
//! Each slice keeps write operations under `commands/`, read operations
//! under `queries/` and its HTTP wiring in `routes.rs`.

pub mod prices;

use axum::Router;

use crate::ingest::ImportPipeline;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Import pipeline; its pool also serves the export query
    pub pipeline: ImportPipeline,
}

/// Mounts every feature under its own prefix
///
/// - `/prices` - archive import and export
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest("/prices", prices::prices_routes().with_state(state.pipeline))
}
