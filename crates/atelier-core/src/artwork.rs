//! Shareable artworks.
//!
//! Artworks are immutable once created. The realtime subsystem only ever
//! reads them (via random sampling); creation happens through the seeding
//! path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for an [`Artwork`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ArtworkId(Uuid);

impl ArtworkId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ArtworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for ArtworkId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// A shareable artifact with a title and a content locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    /// Unique opaque id.
    pub id: ArtworkId,
    /// Title shown to recipients.
    pub title: String,
    /// Path or URL to the artwork content.
    pub file_path: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Fields required to create an [`Artwork`] (seeding path only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewArtwork {
    /// Title shown to recipients.
    pub title: String,
    /// Path or URL to the artwork content.
    pub file_path: String,
}
