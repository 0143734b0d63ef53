use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("homeserver returned {status}: {errcode}: {error}")]
    Status {
        status: StatusCode,
        errcode: String,
        error: String,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is missing `{0}`")]
    MissingField(&'static str),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl MatrixError {
    /// The Matrix `errcode` (e.g. `M_FORBIDDEN`) if the homeserver sent one.
    pub fn errcode(&self) -> Option<&str> {
        match self {
            MatrixError::Status { errcode, .. } => Some(errcode),
            _ => None,
        }
    }
}
