//! Server error types.
//!
//! One taxonomy for everything the realtime subsystem can fail with. Every
//! variant is reported to the originating connection only; nothing here is
//! ever broadcast, and nothing here terminates the process.

use atelier_core::DirectoryError;
use thiserror::Error;

/// Errors from realtime request handling.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The connection has no bound identity where one is required.
    #[error("no identity bound to this connection")]
    Session,

    /// No artwork exists to share.
    #[error("No artwork found in the database")]
    NoContent,

    /// The referenced message id is malformed or unknown.
    #[error("message not found: {0}")]
    MessageNotFound(String),

    /// Guest identity creation exhausted its retry budget.
    #[error("guest onboarding failed after {attempts} attempts")]
    OnboardingExhausted {
        /// How many creation attempts were made.
        attempts: u32,
    },

    /// The directory reported a failure.
    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Transport/network failure.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or seed manifest.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invariant breach inside the server itself.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Whether an acknowledgment failure should be echoed back to the
    /// originating connection as an `error` event.
    ///
    /// A missing session binding is the one silent case: the caller sees a
    /// no-op while the failure stays observable in the logs.
    pub fn reportable(&self) -> bool {
        !matches!(self, Self::Session)
    }
}
