//! Route definitions for stored model files.

use axum::routing::get;
use axum::Router;

use crate::handlers::files;
use crate::state::AppState;

/// ```text
/// GET    /files                    -> list_files
/// GET    /download/{file_name}     -> download_file
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/files", get(files::list_files))
        .route("/download/{file_name}", get(files::download_file))
}
