//! Shared application context.
//!
//! One explicit, injectable object owns every piece of shared state the
//! connection handlers touch: the directory handle, the session bindings,
//! the room registry, and the services built on top. Handlers receive a
//! clone instead of reaching for globals.

use std::sync::Arc;

use atelier_core::Directory;

use crate::ack::AckTracker;
use crate::binder::IdentityBinder;
use crate::broadcast::BroadcastService;
use crate::registry::RoomRegistry;

/// Process-wide context handed to every connection handler.
#[derive(Clone)]
pub struct AppState {
    /// System of record for identities, artworks, and messages.
    pub directory: Arc<dyn Directory>,
    /// Session-to-identity bindings.
    pub binder: IdentityBinder,
    /// Room membership and fan-out.
    pub rooms: RoomRegistry,
    /// Share orchestration.
    pub broadcast: BroadcastService,
    /// Acknowledgment recording.
    pub ack: AckTracker,
}

impl AppState {
    /// Wire up the full context over a directory.
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        let rooms = RoomRegistry::new();
        let binder = IdentityBinder::new(Arc::clone(&directory), rooms.clone());
        let broadcast =
            BroadcastService::new(Arc::clone(&directory), binder.clone(), rooms.clone());
        let ack = AckTracker::new(Arc::clone(&directory), binder.clone());
        Self { directory, binder, rooms, broadcast, ack }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("binder", &self.binder)
            .field("rooms", &self.rooms)
            .finish_non_exhaustive()
    }
}
