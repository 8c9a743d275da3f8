//! Acknowledgment tracking.
//!
//! `AckTracker` records that an identity has seen a message. The update is
//! a private state change: no fan-out happens on acknowledgment. Failures
//! here must never take down the connection or the room, so everything
//! surfaces as a typed error for the handler to report (or, for a missing
//! session, merely log).

use std::sync::Arc;

use atelier_core::{Directory, DirectoryError, MessageId};

use crate::binder::IdentityBinder;
use crate::error::ServerError;
use crate::registry::ConnectionId;

/// Records per-identity acknowledgments against persisted messages.
#[derive(Clone)]
pub struct AckTracker {
    directory: Arc<dyn Directory>,
    binder: IdentityBinder,
}

impl AckTracker {
    /// Create a tracker over the shared directory and binder.
    pub fn new(directory: Arc<dyn Directory>, binder: IdentityBinder) -> Self {
        Self { directory, binder }
    }

    /// Mark `raw_message_id` as seen by the identity bound to `conn`.
    ///
    /// Idempotent: repeated calls for the same pair leave the
    /// acknowledgment set unchanged. A malformed or unknown id yields
    /// [`ServerError::MessageNotFound`]; an unbound connection yields
    /// [`ServerError::Session`], which callers treat as a logged no-op.
    pub async fn mark_seen(
        &self,
        conn: ConnectionId,
        raw_message_id: &str,
    ) -> Result<(), ServerError> {
        let Some(identity) = self.binder.resolve(conn) else {
            tracing::warn!(%conn, "mark_seen from connection with no bound identity");
            return Err(ServerError::Session);
        };

        // A syntactically invalid id can't reference any message.
        let message_id: MessageId = raw_message_id
            .parse()
            .map_err(|_| ServerError::MessageNotFound(raw_message_id.to_owned()))?;

        match self.directory.add_acknowledgment(message_id, identity).await {
            Ok(()) => {
                tracing::debug!(%conn, %message_id, %identity, "message acknowledged");
                Ok(())
            },
            Err(DirectoryError::MessageNotFound(id)) => {
                Err(ServerError::MessageNotFound(id.to_string()))
            },
            Err(other) => Err(other.into()),
        }
    }
}

impl std::fmt::Debug for AckTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AckTracker").finish_non_exhaustive()
    }
}
