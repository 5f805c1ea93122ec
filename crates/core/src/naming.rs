//! Naming conventions for stored model files and derived URLs.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Extension of every stored model file.
pub const MODEL_EXTENSION: &str = "glb";

/// A plain file name: no separators, no leading dot.
const SAFE_FILE_NAME_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9._-]{0,254}$";

static SAFE_FILE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SAFE_FILE_NAME_PATTERN).expect("valid regex"));

/// Build the stored model file name.
///
/// Convention: `architecture_{YYYYmmdd_HHMMSS}_{suffix}.glb`
///
/// ```
/// use chrono::TimeZone;
/// use delta_core::naming::model_file_name;
///
/// let at = chrono::Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 5).unwrap();
/// assert_eq!(model_file_name(at, "ab12cd34"), "architecture_20250301_123005_ab12cd34.glb");
/// ```
pub fn model_file_name(at: Timestamp, suffix: &str) -> String {
    format!(
        "architecture_{}_{suffix}.{MODEL_EXTENSION}",
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Model file name for "now" with a random 8-hex suffix.
pub fn new_model_file_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    model_file_name(chrono::Utc::now(), &id[..8])
}

/// Path clients use to fetch a stored model.
pub fn download_url(file_name: &str) -> String {
    format!("/download/{file_name}")
}

/// Path clients poll for an async job.
pub fn poll_url(job_id: &str) -> String {
    format!("/job/{job_id}")
}

/// Whether `name` is a plain file name safe to join onto the output dir.
pub fn is_safe_file_name(name: &str) -> bool {
    SAFE_FILE_NAME_RE.is_match(name) && !name.contains("..")
}

/// Reject names that could escape the output directory.
pub fn validate_file_name(name: &str) -> Result<(), CoreError> {
    if is_safe_file_name(name) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Invalid file name '{name}'")))
    }
}
