use thiserror::Error;

/// Message fragments that mark a 404 in errors that only carry text.
const NOT_FOUND_MARKERS: [&str; 2] = [
    "unexpected response status: 404",
    "unexpected response status 404",
];

/// Errors returned by the Checkly API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered with a non-success status.
    #[error("unexpected response status: {status}, {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// An error that only carries a message.
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Whether this error means the remote object does not exist.
    ///
    /// Structured statuses are checked directly; message-only errors fall
    /// back to matching the status text. This is the only place that
    /// inspects error text.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 404,
            other => {
                let message = other.to_string();
                NOT_FOUND_MARKERS.iter().any(|m| message.contains(m))
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
