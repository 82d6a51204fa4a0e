//! Adapter error types.

use thiserror::Error;

/// Errors surfaced by the Twitter connection adapter.
#[derive(Error, Debug)]
pub enum TwitterError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Credential store I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// OAuth signing or token exchange failed
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// Twitter API returned a non-2xx response
    #[error("Request returned an error: {status} {body}")]
    Api { status: u16, body: String },

    /// Username could not be resolved to a numeric user id
    #[error("failed to get user id for username {username}: {source}")]
    Lookup {
        username: String,
        #[source]
        source: Box<TwitterError>,
    },

    /// Input rejected before any request was made
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or empty credentials
    #[error("configuration error: {0}")]
    Config(String),

    /// Action name is not in the registry
    #[error("unknown action: {0}")]
    UnknownAction(String),
}

impl TwitterError {
    /// Wrap a resolution failure with the username that caused it.
    #[must_use]
    pub fn lookup(username: impl Into<String>, source: Self) -> Self {
        Self::Lookup {
            username: username.into(),
            source: Box::new(source),
        }
    }
}

/// Result type for adapter operations.
pub type TwitterResult<T> = Result<T, TwitterError>;
