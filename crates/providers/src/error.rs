use delta_core::error::CoreError;

/// Errors raised by provider adapters.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider credential is absent.
    #[error("{0}")]
    NotConfigured(String),

    /// The caller supplied unusable input; no network call was made.
    #[error("{0}")]
    InvalidRequest(String),

    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("{provider} API error ({status}): {body}")]
    ApiError {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// A 2xx response that did not contain what we need.
    #[error("{provider} returned unusable data: {detail}")]
    InvalidResponse {
        provider: &'static str,
        detail: String,
    },

    /// Storing the produced model locally failed.
    #[error("Model storage failed: {0}")]
    Storage(String),
}

impl From<ProviderError> for CoreError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => CoreError::ServiceUnavailable(msg),
            ProviderError::InvalidRequest(msg) => CoreError::Validation(msg),
            other => CoreError::Upstream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn not_configured_maps_to_service_unavailable() {
        let err: CoreError = ProviderError::NotConfigured("fal.ai not configured".into()).into();
        assert_matches!(err, CoreError::ServiceUnavailable(msg) if msg == "fal.ai not configured");
    }

    #[test]
    fn invalid_request_maps_to_validation() {
        let err: CoreError = ProviderError::InvalidRequest("no image".into()).into();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn api_error_keeps_provider_text() {
        let err: CoreError = ProviderError::ApiError {
            provider: "OpenAI",
            status: 429,
            body: "rate limit exceeded".into(),
        }
        .into();
        assert_eq!(
            err,
            CoreError::Upstream("OpenAI API error (429): rate limit exceeded".into())
        );
    }
}
