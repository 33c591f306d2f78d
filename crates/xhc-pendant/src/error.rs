//! Error types for the pendant engine.

use hid_xhc_protocol::XhcError;
use thiserror::Error;

/// Errors that can occur while running a pendant session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PendantError {
    /// A transfer buffer did not have the size of an input report.
    ///
    /// Not fatal: the frame is rejected and no state is touched.
    #[error("Malformed frame: expected {expected} bytes, got {actual}")]
    MalformedFrame {
        /// Required frame size.
        expected: usize,
        /// Received frame size.
        actual: usize,
    },

    /// Report content could not be decoded.
    #[error("Protocol error: {0}")]
    Protocol(#[from] XhcError),

    /// The transport failed; the session stops.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl PendantError {
    /// Create a malformed frame error.
    #[must_use]
    pub fn malformed_frame(expected: usize, actual: usize) -> Self {
        Self::MalformedFrame { expected, actual }
    }

    /// Create a transport failure error.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport(reason.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// Returns `true` if the session cannot continue after this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::InvalidConfiguration(_))
    }
}

/// A specialized `Result` type for pendant operations.
pub type PendantResult<T> = std::result::Result<T, PendantError>;
