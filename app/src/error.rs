use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use iris::PredictError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent parameters that could not be coerced or are out of range.
    #[error("invalid request parameters: {0}")]
    InvalidParameters(String),
    #[error("prediction failed: {0}")]
    Prediction(PredictError),
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl From<PredictError> for ServerError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::InvalidInput(msg) => ServerError::InvalidParameters(msg),
            other => ServerError::Prediction(other),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::InvalidParameters(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "Invalid Request Parameters\n").into_response()
            }
            ServerError::Prediction(err) => {
                tracing::error!("Internal error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error\n").into_response()
            }
            ServerError::Template(err) => {
                tracing::error!("Internal error: template rendering failed: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error\n").into_response()
            }
        }
    }
}
