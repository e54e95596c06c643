//! Client error taxonomy.
//!
//! DESIGN
//! ======
//! One enum covers every failure a caller can observe. Transport failures
//! (`Network`, `Timeout`) are transient and safe to retry through polling;
//! `Auth` carries 401/403 responses, which the response middleware has
//! already acted on by the time the caller sees them; `Validation` is raised
//! before anything is dispatched.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Preconditions checked on message content before it is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("message content is empty")]
    Empty,
    #[error("message content is {len} characters (max {max})")]
    TooLong { len: usize, max: usize },
}

/// Errors produced by client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The backend rejected the credentials (401/403).
    #[error("unauthorized: status {status}")]
    Auth { status: u16, body: String },

    /// The backend answered with any other non-success status.
    #[error("server error: status {status}")]
    Server { status: u16, body: String },

    /// Input failed a client-side precondition and was never sent.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A request body could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(String),

    /// A response body could not be deserialized.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The token store could not be read or written.
    #[error("token storage failed: {0}")]
    Storage(String),

    /// Login/logout attempted before session initialization finished.
    #[error("session is not ready")]
    SessionNotReady,

    /// Login attempted while a user is already logged in.
    #[error("already logged in; log out first")]
    AlreadyAuthenticated,

    /// A configuration value is invalid.
    #[error("config invalid: {0}")]
    Config(String),
}

impl ClientError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Auth { status, body },
            _ => Self::Server { status, body },
        }
    }

    /// HTTP status carried by the error, if the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::Timeout => "E_TIMEOUT",
            Self::Auth { .. } => "E_AUTH",
            Self::Server { .. } => "E_SERVER",
            Self::Validation(_) => "E_VALIDATION",
            Self::Encode(_) => "E_ENCODE",
            Self::Decode(_) => "E_DECODE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Storage(_) => "E_STORAGE",
            Self::SessionNotReady => "E_SESSION_NOT_READY",
            Self::AlreadyAuthenticated => "E_ALREADY_AUTHENTICATED",
            Self::Config(_) => "E_CONFIG",
        }
    }

    /// Whether a later attempt could succeed without any change on our side.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout | Self::Server { status: 500..=599, .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { Self::Timeout } else { Self::Network(err.to_string()) }
    }
}
