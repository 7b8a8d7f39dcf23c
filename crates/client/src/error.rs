//! Errors from the DGB API client layer.

/// Errors from talking to the DGB backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// No response arrived within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The backend returned a non-2xx status code.
    #[error("DGB API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body did not match the expected schema.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The backend understood the request and refused it
    /// (e.g. wrong credentials).
    #[error("{0}")]
    Rejected(String),

    /// The configured base URL or a derived endpoint URL is invalid.
    #[error("Invalid URL: {0}")]
    Url(String),
}

impl ClientError {
    /// `true` for failures below HTTP: connection, DNS, timeouts.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Timeout)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Request(err)
        }
    }
}
