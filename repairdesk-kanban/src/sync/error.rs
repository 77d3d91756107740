//! Error types for the remote placement endpoint

use std::time::Duration;
use thiserror::Error;

/// Why a move was not persisted.
///
/// The controller treats every variant the same way (roll back); the
/// distinction is for logs and callers that want to show a reason.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network-level failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server rejected move ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// No answer within the configured timeout
    #[error("no response after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Endpoint could not be built from configuration
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Any other collaborator failure (test doubles, custom transports)
    #[error("{0}")]
    Other(String),
}

impl SyncError {
    /// Create a rejection error
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Whether re-attempting the same drag might succeed.
    ///
    /// Nothing retries automatically; this only helps callers phrase feedback.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Rejected { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidUrl(_) | Self::Other(_) => false,
        }
    }
}
