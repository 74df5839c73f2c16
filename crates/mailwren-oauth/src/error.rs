//! Error types for `OAuth2` operations.

/// Result type alias for `OAuth2` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `OAuth2` error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No access token is available for authentication.
    #[error("no token available: {0}")]
    NoToken(String),

    /// The access token has already expired.
    #[error("token expired: {0}")]
    TokenExpired(String),

    /// The SASL payload failed its structural self-check.
    #[error("malformed SASL payload: {0}")]
    MalformedPayload(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
