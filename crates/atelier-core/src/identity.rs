//! Participant identities.
//!
//! An [`Identity`] is a durable participant record. It is created either by
//! an explicit registration flow (outside this crate) or lazily by the
//! server when an unbound connection first arrives. Identities are never
//! deleted by the realtime subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for an [`Identity`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct IdentityId(Uuid);

impl IdentityId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for IdentityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// A durable participant record (guest or registered).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique opaque id.
    pub id: IdentityId,
    /// Globally unique username.
    pub username: String,
    /// Globally unique email address.
    pub email: String,
    /// Opaque password material. Hashing and verification live outside
    /// this crate; the realtime subsystem never inspects this field.
    pub password_hash: String,
    /// Name shown alongside shares.
    pub display_name: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// Last observed activity.
    pub last_active: DateTime<Utc>,
}

/// Fields required to create an [`Identity`].
#[derive(Debug, Clone)]
pub struct NewIdentity {
    /// Candidate username. Must be globally unique.
    pub username: String,
    /// Candidate email. Must be globally unique.
    pub email: String,
    /// Opaque password material, stored verbatim.
    pub password_hash: String,
    /// Display name; defaults to the username when empty.
    pub display_name: String,
}

impl NewIdentity {
    /// Resolve the effective display name (falls back to the username).
    pub fn effective_display_name(&self) -> &str {
        if self.display_name.is_empty() { &self.username } else { &self.display_name }
    }
}
