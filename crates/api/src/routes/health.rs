use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

const SERVICE_NAME: &str = "Delta Architecture 3D Generation Server";
const PIPELINE_DESCRIPTION: &str = "Text → OpenAI Clean → DALL-E 2D → fal.ai Trellis 3D";

/// Connection state of each provider as shown on the root page.
#[derive(Serialize)]
pub struct ServiceStates {
    pub openai: &'static str,
    pub fal_ai: &'static str,
}

/// Root info payload.
#[derive(Serialize)]
pub struct RootResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub pipeline: &'static str,
    pub output_format: &'static str,
    pub services: ServiceStates,
}

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub openai_configured: bool,
    pub fal_configured: bool,
    /// Async jobs not yet completed or failed.
    pub active_jobs: usize,
}

fn connection_label(configured: bool) -> &'static str {
    if configured {
        "connected"
    } else {
        "not configured"
    }
}

/// GET / -- describes the service and which providers are configured.
async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        name: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        pipeline: PIPELINE_DESCRIPTION,
        output_format: "GLB",
        services: ServiceStates {
            openai: connection_label(state.pipeline.openai_configured()),
            fal_ai: connection_label(state.pipeline.fal_configured()),
        },
    })
}

/// GET /health -- liveness plus provider configuration flags.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        openai_configured: state.pipeline.openai_configured(),
        fal_configured: state.pipeline.fal_configured(),
        active_jobs: state.pipeline.jobs().in_flight().await,
    })
}

/// Mount the root info and health check routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}
