//! Local store for downloaded model files.
//!
//! Files live flat in one directory; names are validated with
//! [`delta_core::naming::validate_file_name`] before touching the disk.

use std::path::{Path, PathBuf};

use delta_core::error::CoreError;
use delta_core::naming::{validate_file_name, MODEL_EXTENSION};
use serde::Serialize;

/// A model file present in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredModel {
    pub file_name: String,
    pub size_bytes: u64,
}

/// Flat directory of stored `.glb` files.
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if needed.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Resolve `file_name` inside the store, rejecting unsafe names.
    pub fn path_for(&self, file_name: &str) -> Result<PathBuf, CoreError> {
        validate_file_name(file_name)?;
        Ok(self.root.join(file_name))
    }

    /// Write `bytes` under `file_name`, returning the number of bytes written.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<u64, CoreError> {
        let path = self.path_for(file_name)?;
        self.ensure_dir()
            .await
            .map_err(|e| CoreError::Internal(format!("create {}: {e}", self.root.display())))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| CoreError::Internal(format!("write {}: {e}", path.display())))?;

        tracing::debug!(file = %path.display(), bytes = bytes.len(), "Stored model file");
        Ok(bytes.len() as u64)
    }

    /// Read a stored file. `Ok(None)` if it does not exist.
    pub async fn read(&self, file_name: &str) -> Result<Option<Vec<u8>>, CoreError> {
        let path = self.path_for(file_name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Internal(format!("read {}: {e}", path.display()))),
        }
    }

    /// List stored model files sorted by name. A missing directory is empty.
    pub async fn list(&self) -> Result<Vec<StoredModel>, CoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CoreError::Internal(format!(
                    "list {}: {e}",
                    self.root.display()
                )))
            }
        };

        let mut models = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CoreError::Internal(format!("list {}: {e}", self.root.display())))?
        {
            let path = entry.path();
            let is_model = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(MODEL_EXTENSION));
            if !is_model {
                continue;
            }
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            models.push(StoredModel {
                file_name: entry.file_name().to_string_lossy().into_owned(),
                size_bytes: meta.len(),
            });
        }

        models.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(models)
    }
}
