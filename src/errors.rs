use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    MissingOrNonNumeric(&'static str),

    #[error("{0}")]
    OutOfRange(&'static str),
}

#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("backend unreachable: {0}")]
    Transport(String),

    #[error("unexpected backend response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { status: 401, .. })
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum TrackerError {
    #[error("Login failed! Invalid credentials!")]
    InvalidCredentials,

    #[error("{0}")]
    Auth(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Please log in first")]
    NotSignedIn,

    #[error("{0}")]
    Unavailable(&'static str),
}

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

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        let status = match &err {
            TrackerError::InvalidCredentials | TrackerError::Auth(_) | TrackerError::NotSignedIn => {
                StatusCode::UNAUTHORIZED
            }
            TrackerError::Validation(_) => StatusCode::BAD_REQUEST,
            TrackerError::Unavailable(_) => StatusCode::CONFLICT,
            TrackerError::Remote(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
