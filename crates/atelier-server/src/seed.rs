//! Artwork seeding from a JSON manifest.
//!
//! The realtime subsystem only reads artworks; this is the one write path,
//! run at startup when `--artworks` is given. The manifest is a JSON array
//! of `{ "title": ..., "file_path": ... }` records.

use std::path::Path;

use atelier_core::{MemoryDirectory, NewArtwork};

use crate::error::ServerError;

/// Load a seed manifest from disk.
pub fn load_manifest(path: &Path) -> Result<Vec<NewArtwork>, ServerError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ServerError::Config(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| ServerError::Config(format!("invalid manifest {}: {e}", path.display())))
}

/// Insert every manifest entry into the directory. Returns how many
/// artworks were seeded.
pub fn seed_directory(directory: &MemoryDirectory, seeds: Vec<NewArtwork>) -> usize {
    let count = seeds.len();
    for seed in seeds {
        let artwork = directory.insert_artwork(seed);
        tracing::debug!(id = %artwork.id, title = %artwork.title, "seeded artwork");
    }
    count
}
