//! Room membership and fan-out.
//!
//! ## Responsibilities
//!
//! - Membership: idempotent join/leave of live connections per room name
//! - Fan-out: best-effort, at-most-once delivery to a membership snapshot
//!
//! ## Design
//!
//! Membership is the only in-process shared state besides session bindings,
//! so it sits behind one mutex. A broadcast clones the member list under
//! the lock and sends after releasing it: the snapshot is atomic with
//! respect to concurrent joins and leaves, and a join that lands after the
//! snapshot legitimately misses that broadcast. Sends to connections whose
//! receiver is gone are dropped, never retried.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use atelier_proto::ServerEvent;
use tokio::sync::mpsc;

/// The single well-known room every connection joins on connect.
pub const MAIN_ROOM: &str = "main_room";

/// Identifier for a live connection, unique for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Outbound event channel for one connection.
pub type OutboundTx = mpsc::UnboundedSender<ServerEvent>;
/// Receiving half drained by the connection's writer task.
pub type OutboundRx = mpsc::UnboundedReceiver<ServerEvent>;

/// Tracks which connections are members of which room.
///
/// Cheaply cloneable; all clones share the same membership map.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<String, HashMap<ConnectionId, OutboundTx>>>>,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<String, HashMap<ConnectionId, OutboundTx>>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a connection to a room. Idempotent: re-joining replaces the
    /// stored sender and nothing else.
    pub fn join(&self, room: &str, conn: ConnectionId, outbound: OutboundTx) {
        let mut rooms = self.lock();
        rooms.entry(room.to_owned()).or_default().insert(conn, outbound);
    }

    /// Remove a connection from a room. Idempotent; empty rooms are
    /// dropped from the map.
    pub fn leave(&self, room: &str, conn: ConnectionId) {
        let mut rooms = self.lock();
        if let Some(members) = rooms.get_mut(room) {
            members.remove(&conn);
            if members.is_empty() {
                rooms.remove(room);
            }
        }
    }

    /// Number of connections currently in a room.
    pub fn member_count(&self, room: &str) -> usize {
        self.lock().get(room).map_or(0, HashMap::len)
    }

    /// Deliver `event` to every current member of `room`.
    ///
    /// Returns the number of members the event was handed to. Members whose
    /// outbound channel is closed (connection already gone) are skipped.
    pub fn broadcast(&self, room: &str, event: &ServerEvent) -> usize {
        let members: Vec<(ConnectionId, OutboundTx)> = {
            let rooms = self.lock();
            rooms
                .get(room)
                .map(|members| members.iter().map(|(c, tx)| (*c, tx.clone())).collect())
                .unwrap_or_default()
        };

        let mut delivered = 0;
        for (conn, tx) in members {
            if tx.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::trace!(%conn, room, "dropping broadcast to closed connection");
            }
        }
        delivered
    }
}

impl std::fmt::Debug for RoomRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomRegistry").field("rooms", &self.lock().len()).finish()
    }
}
