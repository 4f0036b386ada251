use thiserror::Error;

/// Errors surfaced by the portal API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The draft is missing required fields; nothing was sent.
    #[error("missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    /// The server answered but rejected the request.
    #[error("{message}")]
    Rejected { message: String },

    /// The request never produced a usable answer.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(TransportError::Http(err))
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors from the location resolver.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("no position source is configured")]
    Unsupported,

    #[error("position lookup refused: {reason}")]
    PermissionDenied { reason: String },

    #[error("reverse geocoding failed: {0}")]
    LookupFailed(#[from] TransportError),
}
