use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error("failed to decode request: {0}")]
    RequestDecodingError(String),
    #[error("failed to parse request: {0}")]
    RequestParsingError(#[from] serde_json::Error),

    #[error("Unknown experiment: {0}")]
    UnknownExperiment(String),
    #[error("No route for fragment: {0}")]
    UnknownRoute(String),

    #[error("Invalid rollout configuration: {0}")]
    InvalidRolloutConfig(String),
    #[error("Failed to read rollout configuration: {0}")]
    RolloutConfigUnreadable(#[from] std::io::Error),
    #[error("Invalid test email pattern: {0}")]
    InvalidTestEmailPattern(#[from] regex::Error),

    #[error("Server failed: {0}")]
    ServerFailed(std::io::Error),
}

impl IntoResponse for ExperimentError {
    fn into_response(self) -> Response {
        match self {
            ExperimentError::RequestDecodingError(_) | ExperimentError::RequestParsingError(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }

            ExperimentError::UnknownExperiment(_) | ExperimentError::UnknownRoute(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }

            ExperimentError::InvalidRolloutConfig(_)
            | ExperimentError::RolloutConfigUnreadable(_)
            | ExperimentError::InvalidTestEmailPattern(_)
            | ExperimentError::ServerFailed(_) => {
                tracing::error!("internal error surfaced in a request: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        }
        .into_response()
    }
}
