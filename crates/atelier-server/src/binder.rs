//! Session-to-identity binding.
//!
//! ## Responsibilities
//!
//! - Resolve an incoming connection to a durable identity, creating a
//!   guest identity on first contact
//! - Keep the binding for the connection's lifetime (never reassigned)
//! - Join the well-known room as part of the connect handshake
//!
//! ## Design
//!
//! Guest usernames are synthesized from a microsecond timestamp, so two
//! connections arriving in the same tick can collide. The directory is the
//! arbiter: creation fails with `UsernameTaken` and the binder retries with
//! a freshly salted candidate, a bounded number of times. Exhausting the
//! budget is a fatal onboarding failure for that connection, surfaced as a
//! typed error rather than swallowed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use atelier_core::{Directory, DirectoryError, Identity, IdentityId, NewIdentity};
use chrono::Utc;

use crate::error::ServerError;
use crate::registry::{ConnectionId, MAIN_ROOM, OutboundTx, RoomRegistry};

/// How many guest creation attempts before onboarding fails.
const MAX_GUEST_ATTEMPTS: u32 = 3;

/// Placeholder password material for guest identities. Guests never log
/// in with credentials; the registration flow replaces this.
const GUEST_PASSWORD_MATERIAL: &str = "!guest";

/// Binds connections to durable identities for the connection's lifetime.
#[derive(Clone)]
pub struct IdentityBinder {
    directory: Arc<dyn Directory>,
    rooms: RoomRegistry,
    bindings: Arc<Mutex<HashMap<ConnectionId, IdentityId>>>,
}

impl IdentityBinder {
    /// Create a binder over the given directory and room registry.
    pub fn new(directory: Arc<dyn Directory>, rooms: RoomRegistry) -> Self {
        Self { directory, rooms, bindings: Arc::new(Mutex::new(HashMap::new())) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ConnectionId, IdentityId>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The identity bound to a connection, if any.
    pub fn resolve(&self, conn: ConnectionId) -> Option<IdentityId> {
        self.lock().get(&conn).copied()
    }

    /// Seed a binding from outside the guest flow.
    ///
    /// This is the hook for sessions that already carry an identity (an
    /// authenticated login or a transport-restored session). A subsequent
    /// [`on_connect`](Self::on_connect) reuses the seeded identity instead
    /// of creating a guest.
    pub fn adopt(&self, conn: ConnectionId, identity: IdentityId) {
        self.lock().insert(conn, identity);
    }

    /// Drop a connection's binding without touching room membership.
    /// Test hook for simulating a cleared session.
    pub fn clear(&self, conn: ConnectionId) {
        self.lock().remove(&conn);
    }

    /// Handle a new connection: resolve or create its identity, bind it,
    /// and join the well-known room in the same handshake.
    pub async fn on_connect(
        &self,
        conn: ConnectionId,
        outbound: OutboundTx,
    ) -> Result<IdentityId, ServerError> {
        let bound = match self.resolve(conn) {
            Some(existing) => {
                self.directory.touch_last_active(existing).await?;
                tracing::debug!(%conn, identity = %existing, "rebound existing identity");
                existing
            },
            None => {
                let guest = self.create_guest().await?;
                tracing::info!(%conn, identity = %guest.id, username = %guest.username, "created guest identity");

                // A racing handler on the same connection may have bound
                // first; the earlier binding wins and is never reassigned.
                *self.lock().entry(conn).or_insert(guest.id)
            },
        };

        self.rooms.join(MAIN_ROOM, conn, outbound);
        Ok(bound)
    }

    /// Handle a disconnect: leave the room and drop the binding. The
    /// identity itself persists in the directory.
    pub fn on_disconnect(&self, conn: ConnectionId) {
        self.rooms.leave(MAIN_ROOM, conn);
        self.lock().remove(&conn);
        tracing::debug!(%conn, "connection unbound");
    }

    async fn create_guest(&self) -> Result<Identity, ServerError> {
        for attempt in 1..=MAX_GUEST_ATTEMPTS {
            let username = synthesize_guest_username(attempt);
            let candidate = NewIdentity {
                email: format!("{username}@guest.invalid"),
                password_hash: GUEST_PASSWORD_MATERIAL.to_owned(),
                display_name: "Guest User".to_owned(),
                username,
            };

            match self.directory.create_identity(candidate).await {
                Ok(identity) => return Ok(identity),
                Err(DirectoryError::UsernameTaken(name) | DirectoryError::EmailTaken(name)) => {
                    // Benign race with another concurrent guest creation in
                    // the same timestamp tick; retry under a fresh name.
                    tracing::debug!(attempt, taken = %name, "guest username collision, retrying");
                },
                Err(other) => return Err(other.into()),
            }
        }

        tracing::error!(attempts = MAX_GUEST_ATTEMPTS, "guest onboarding retry budget exhausted");
        Err(ServerError::OnboardingExhausted { attempts: MAX_GUEST_ATTEMPTS })
    }
}

impl std::fmt::Debug for IdentityBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityBinder").field("bindings", &self.lock().len()).finish()
    }
}

/// Synthesize a guest username from the current time. Retries add a random
/// salt so a collision within one timestamp tick cannot repeat.
fn synthesize_guest_username(attempt: u32) -> String {
    let micros = Utc::now().timestamp_micros();
    if attempt == 1 {
        format!("guest_{micros}")
    } else {
        let salt: u16 = rand::random();
        format!("guest_{micros}_{salt:04x}")
    }
}
