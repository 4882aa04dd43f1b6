use axum::http::StatusCode;
use std::fmt;
use std::path::PathBuf;

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
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// A dataset that cannot be loaded is terminal for the process; there
/// is no retry and no fallback dataset.
#[derive(Debug)]
pub enum DatasetError {
    Read(PathBuf, std::io::Error),
    Parse(serde_json::Error),
    InvalidDate(String),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Read(path, err) => {
                write!(f, "failed to read dataset {}: {err}", path.display())
            }
            DatasetError::Parse(err) => write!(f, "failed to parse dataset: {err}"),
            DatasetError::InvalidDate(date) => {
                write!(f, "dataset contains an invalid date: {date:?}")
            }
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Read(_, err) => Some(err),
            DatasetError::Parse(err) => Some(err),
            DatasetError::InvalidDate(_) => None,
        }
    }
}
