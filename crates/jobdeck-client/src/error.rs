use thiserror::Error;

/// Errors from status-API calls.
///
/// Both variants carry the endpoint and the request payload with the access
/// token redacted, so operators can reproduce a failing query without the
/// log ever holding a usable ticket.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The call never produced a decodable response: network failure,
    /// timeout, or a body that is not JSON.
    #[error("Transport error calling {endpoint}: {message}")]
    Transport {
        endpoint: String,
        message: String,
        /// Redacted request payload for diagnostics.
        payload: String,
    },

    /// The API answered, but with an explicit error field.
    #[error("Status API error from {endpoint}: {message}")]
    Api {
        endpoint: String,
        message: String,
        payload: String,
    },
}

impl QueryError {
    pub fn endpoint(&self) -> &str {
        match self {
            QueryError::Transport { endpoint, .. } | QueryError::Api { endpoint, .. } => endpoint,
        }
    }

    /// The user-facing message (no internals beyond what the API said).
    pub fn message(&self) -> &str {
        match self {
            QueryError::Transport { message, .. } | QueryError::Api { message, .. } => message,
        }
    }

    /// The redacted request payload for operator diagnostics.
    pub fn payload(&self) -> &str {
        match self {
            QueryError::Transport { payload, .. } | QueryError::Api { payload, .. } => payload,
        }
    }
}

/// Result type for status-API calls.
pub type Result<T> = std::result::Result<T, QueryError>;
