use serde_json::Value;
use thiserror::Error;

/// Easy alias for error handling
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can happen while processing requests
#[derive(Debug, Error)]
pub enum Error {
    /// We couldn't parse a URL, for example if the base URL was invalid.
    #[error("URL error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// We couldn't reach the server, or it sent back something that wasn't
    /// an envelope.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The envelope said everything went fine, but `data` didn't have the
    /// shape we expected.
    #[error("unexpected response data: {0}")]
    Data(#[from] serde_json::Error),

    /// The server rejected the request (4xx.) `data` holds whatever detail it
    /// gave, for example a map of field errors.
    #[error("{message} ({status})")]
    Client {
        /// The status from the envelope
        status: u16,

        /// The message from the envelope
        message: String,

        /// Error details from the envelope
        data: Value,
    },

    /// The server failed while handling the request (5xx.)
    #[error("server error: {0}")]
    Server(String),

    /// We tried to make an authenticated request without logging in first.
    #[error("not logged in")]
    Unauthenticated,

    /// The server returned a status we don't know how to handle.
    #[error("unexpected status: {0}")]
    Unexpected(u16),
}
