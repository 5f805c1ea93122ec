use std::sync::Arc;

use delta_pipeline::Pipeline;
use delta_providers::storage::ModelStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Provider adapters plus the job registry.
    pub pipeline: Pipeline,
    /// Downloaded model files served under `/download/`.
    pub store: ModelStore,
}
