/// Domain error shared by every crate in the workspace.
///
/// The variants line up with the HTTP statuses the API layer returns:
/// `NotFound` (404), `Validation` (400), `ServiceUnavailable` (503),
/// `Upstream` (500 with the provider text), `Internal` (500, sanitized).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Prefix an upstream failure with the stage or operation that produced it,
    /// e.g. `"Image generation failed: <provider text>"`.
    ///
    /// Non-upstream errors pass through unchanged.
    pub fn in_stage(self, label: &str) -> Self {
        match self {
            CoreError::Upstream(msg) => CoreError::Upstream(format!("{label} failed: {msg}")),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_stage_prefixes_upstream_message() {
        let err = CoreError::Upstream("rate limited".into()).in_stage("Prompt cleaning");
        assert_eq!(err.to_string(), "Prompt cleaning failed: rate limited");
    }

    #[test]
    fn in_stage_leaves_other_variants_alone() {
        let err = CoreError::ServiceUnavailable("OpenAI not configured".into());
        assert_eq!(err.clone().in_stage("Prompt cleaning"), err);
    }

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = CoreError::NotFound {
            entity: "Job",
            id: "abc".into(),
        };
        assert_eq!(err.to_string(), "Job not found: abc");
    }
}
