//! Handlers for downloading and listing stored model files.

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use delta_core::error::CoreError;
use delta_core::naming::download_url;
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

/// MIME type of binary glTF.
pub const GLB_CONTENT_TYPE: &str = "model/gltf-binary";

/// One entry of `GET /files`.
#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub file_name: String,
    pub size_bytes: u64,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<FileEntry>,
}

/// GET /download/{file_name}
///
/// Stream a stored GLB back as an attachment. 400 for names that are not a
/// plain file name, 404 if the file does not exist.
pub async fn download_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let bytes = state
        .store
        .read(&file_name)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "File",
            id: file_name.clone(),
        })?;

    Ok((
        [
            (CONTENT_TYPE, GLB_CONTENT_TYPE.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    ))
}

/// GET /files
///
/// List stored model files, sorted by name.
pub async fn list_files(State(state): State<AppState>) -> AppResult<Json<FileListResponse>> {
    let files = state
        .store
        .list()
        .await?
        .into_iter()
        .map(|m| FileEntry {
            download_url: download_url(&m.file_name),
            file_name: m.file_name,
            size_bytes: m.size_bytes,
        })
        .collect();

    Ok(Json(FileListResponse { files }))
}
