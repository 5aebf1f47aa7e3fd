use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Provider error: {0}")]
    ProviderError(String),
    #[error("Upload error: {0}")]
    UploadError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("No usable output: {0}")]
    EmptyOutput(String),
}

pub type Result<T> = std::result::Result<T, GenError>;

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

impl GenError {
    /// Short, user-facing summary placed in the `error` field.
    pub fn summary(&self) -> &'static str {
        match self {
            GenError::ConfigError(_) => "Server configuration error",
            GenError::InvalidInput(_) => "Invalid input",
            GenError::UploadError(_) => "Image upload failed",
            GenError::RequestError(_) => "Invalid provider request",
            GenError::ProviderError(_) | GenError::ResponseError(_) => "Provider request failed",
            GenError::EmptyOutput(_) => "Generation failed",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            GenError::ConfigError(msg)
            | GenError::InvalidInput(msg)
            | GenError::RequestError(msg)
            | GenError::ProviderError(msg)
            | GenError::UploadError(msg)
            | GenError::ResponseError(msg)
            | GenError::EmptyOutput(msg) => msg,
        }
    }
}

impl ResponseError for GenError {
    fn status_code(&self) -> StatusCode {
        match self {
            GenError::InvalidInput(_) | GenError::UploadError(_) => StatusCode::BAD_REQUEST,
            GenError::ProviderError(_) | GenError::ResponseError(_) => StatusCode::BAD_GATEWAY,
            GenError::ConfigError(_)
            | GenError::RequestError(_)
            | GenError::EmptyOutput(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.summary().to_string(),
            detail: self.detail().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GenError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GenError::ProviderError("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GenError::EmptyOutput("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GenError::ConfigError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display_and_detail() {
        let err = GenError::EmptyOutput("No image URLs returned from model".into());
        assert_eq!(
            err.to_string(),
            "No usable output: No image URLs returned from model"
        );
        assert_eq!(err.summary(), "Generation failed");
        assert_eq!(err.detail(), "No image URLs returned from model");
    }
}
