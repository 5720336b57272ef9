use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// Errors raised before any provider is contacted
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("provider '{0}' is not supported by this gateway")]
    UnsupportedProvider(String),
}

impl GatewayError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Malformed(_) | GatewayError::UnknownProvider(_) => StatusCode::BAD_REQUEST,
            GatewayError::UnsupportedProvider(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

// Errors from talking to a provider. These never leave the router as errors;
// they are turned into error text for the caller.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("no valid API key configured for {provider} (set {env_var})")]
    MissingApiKey {
        provider: String,
        env_var: &'static str,
    },

    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("{provider} rate limited: {message}")]
    RateLimited { provider: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("{provider} stream error: {message}")]
    Stream { provider: String, message: String },
}

impl ProviderError {
    pub fn stream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stream {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_status() {
        assert_eq!(GatewayError::malformed("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::UnknownProvider("foo".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::UnsupportedProvider("xai".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_missing_key_names_provider_and_variable() {
        let err = ProviderError::MissingApiKey {
            provider: "Groq".into(),
            env_var: "GROQ_API_KEY",
        };
        let text = err.to_string();
        assert!(text.contains("Groq"));
        assert!(text.contains("GROQ_API_KEY"));
    }
}
