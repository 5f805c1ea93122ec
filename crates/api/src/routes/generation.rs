//! Route definitions for the generation endpoints.

use axum::routing::post;
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Generation routes, mounted at the root.
///
/// ```text
/// POST   /clean-prompt                   -> clean_prompt
/// POST   /generate-image                 -> generate_image
/// POST   /generate-3d                    -> generate_3d
/// POST   /generate-architecture          -> generate_architecture
/// POST   /generate-architecture-async    -> generate_architecture_async
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clean-prompt", post(generation::clean_prompt))
        .route("/generate-image", post(generation::generate_image))
        .route("/generate-3d", post(generation::generate_3d))
        .route(
            "/generate-architecture",
            post(generation::generate_architecture),
        )
        .route(
            "/generate-architecture-async",
            post(generation::generate_architecture_async),
        )
}
