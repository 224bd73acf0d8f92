//! Error types for the chat client.

use thiserror::Error;

/// Errors found while validating [`ChatConfig`](crate::ChatConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The identity or room could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] tourney_chat_core::IdError),

    /// The server URL is not an http(s) URL.
    #[error("invalid server url: {0:?}")]
    InvalidBaseUrl(String),

    /// The poll interval is zero.
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,

    /// The CSRF token cannot be sent as a header value.
    #[error("csrf token contains characters not allowed in a header")]
    InvalidCsrfToken,
}

/// Errors returned by a [`ChatTransport`](crate::ChatTransport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the body, if any.
        message: String,
    },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// A configured header value is not valid.
    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),
}
