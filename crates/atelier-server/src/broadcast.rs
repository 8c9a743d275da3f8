//! Share orchestration.
//!
//! `BroadcastService` turns a `send_art` request into a persisted message
//! plus a room-wide `new_art` event. Persistence and fan-out form one
//! logical operation: any failure before the fan-out short-circuits, so a
//! broadcast never references a message that was not persisted. A message
//! persisted but not fanned out (its connection vanished, a later lookup
//! failed) is valid durable history and is never rolled back.

use std::sync::Arc;

use atelier_core::Directory;
use atelier_proto::{ArtworkRef, NewArtPayload, ServerEvent};

use crate::binder::IdentityBinder;
use crate::error::ServerError;
use crate::registry::{ConnectionId, MAIN_ROOM, RoomRegistry};

/// Orchestrates "share a random artwork" requests.
#[derive(Clone)]
pub struct BroadcastService {
    directory: Arc<dyn Directory>,
    binder: IdentityBinder,
    rooms: RoomRegistry,
}

impl BroadcastService {
    /// Create a service over the shared directory, binder, and registry.
    pub fn new(directory: Arc<dyn Directory>, binder: IdentityBinder, rooms: RoomRegistry) -> Self {
        Self { directory, binder, rooms }
    }

    /// Select a random artwork, persist a share record, and fan it out to
    /// the room.
    ///
    /// Returns the broadcast payload on success. Failures are the caller's
    /// to report to the originating connection; they are never broadcast.
    pub async fn share_random_artwork(
        &self,
        conn: ConnectionId,
    ) -> Result<NewArtPayload, ServerError> {
        // The session must already carry an identity; we never touch the
        // directory on behalf of an unbound connection.
        let sender = self.binder.resolve(conn).ok_or(ServerError::Session)?;

        let artwork =
            self.directory.sample_random_artwork().await?.ok_or(ServerError::NoContent)?;

        let message = self.directory.create_message(sender, artwork.id).await?;

        // Read-only lookup of display fields for the outgoing payload.
        let identity = self
            .directory
            .find_identity_by_id(sender)
            .await?
            .ok_or_else(|| ServerError::Internal(format!("bound identity {sender} not in directory")))?;

        let payload = NewArtPayload {
            message_id: message.id.to_string(),
            user_id: identity.id.to_string(),
            username: identity.username,
            display_name: identity.display_name,
            artwork: ArtworkRef {
                id: artwork.id.to_string(),
                title: artwork.title,
                file_path: artwork.file_path,
            },
            timestamp: message.timestamp,
        };

        let delivered =
            self.rooms.broadcast(MAIN_ROOM, &ServerEvent::NewArt(payload.clone()));
        tracing::info!(
            %conn,
            message_id = %message.id,
            sender = %sender,
            delivered,
            "artwork shared"
        );

        Ok(payload)
    }
}

impl std::fmt::Debug for BroadcastService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastService").finish_non_exhaustive()
    }
}
