//! Core data model and directory contract for the atelier share service.
//!
//! This crate defines the durable records the service operates on and the
//! narrow read/write contract ([`Directory`]) through which the realtime
//! subsystem reaches its system of record:
//!
//! ```text
//! atelier-core
//!   ├─ Identity / Artwork / Message   (durable records)
//!   ├─ Directory                      (storage contract, async)
//!   └─ MemoryDirectory                (in-process system of record)
//! ```
//!
//! The directory owns all cross-record atomicity: username/email uniqueness
//! at identity creation and set-append semantics for message acknowledgments.
//! Callers never hold in-process locks across a directory call.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artwork;
mod directory;
mod identity;
mod memory;
mod message;

pub use artwork::{Artwork, ArtworkId, NewArtwork};
pub use directory::{Directory, DirectoryError};
pub use identity::{Identity, IdentityId, NewIdentity};
pub use memory::MemoryDirectory;
pub use message::{Message, MessageId};
