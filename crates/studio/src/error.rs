//! User-facing error types for the studio.
//!
//! [`GenerationError`] is what a presentation layer shows after a generate
//! attempt. Its `Display` output is the message to put on screen.

use std::path::PathBuf;

use dgb_client::ClientError;
use dgb_core::error::CoreError;

/// Shown for any connectivity failure. The underlying cause is logged,
/// not displayed.
pub const NETWORK_MESSAGE: &str =
    "Could not reach the generation service. Check your connection and try again.";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// The form did not produce a valid request. Nothing was sent.
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error("The generation service is unavailable")]
    ServiceUnavailable,

    /// The service reported a failure; the reason is shown verbatim.
    #[error("{0}")]
    GenerationFailed(String),

    /// Transport-level failure. Holds the cause for logs only.
    #[error("{}", NETWORK_MESSAGE)]
    Network(String),

    #[error("Sign in to generate music")]
    NotSignedIn,

    #[error("A generation is already in progress")]
    Busy,
}

impl From<ClientError> for GenerationError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Request(_) | ClientError::Timeout | ClientError::Url(_) => {
                Self::Network(err.to_string())
            }
            ClientError::Api { status, .. } => {
                Self::GenerationFailed(format!("Generation service error (HTTP {status})"))
            }
            ClientError::Decode(_) => Self::GenerationFailed(
                "The generation service returned an unreadable response".into(),
            ),
            ClientError::Rejected(reason) => Self::GenerationFailed(reason),
        }
    }
}

/// Errors from signing in or persisting the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Session file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
