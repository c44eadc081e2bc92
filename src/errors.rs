use crate::oracle::OracleError;
use axum::http::StatusCode;
use tracing::warn;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(what: &str, id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("{what} '{id}' not found"),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

/// AI failures are surfaced as a readable, non-fatal message.
impl From<OracleError> for AppError {
    fn from(err: OracleError) -> Self {
        warn!("oracle request failed: {err}");
        let message = match err {
            OracleError::MissingKey => {
                "No API key configured. Set GEMINI_API_KEY to use the Oracle.".to_string()
            }
            OracleError::Malformed(_) => {
                "The Oracle answered in a shape we could not read. Please try again.".to_string()
            }
            other => format!("The Oracle could not be reached ({other}). Please try again later."),
        };
        Self {
            status: StatusCode::BAD_GATEWAY,
            message,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
