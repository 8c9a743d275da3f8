//! Realtime broadcast and acknowledgment server for shared artworks.
//!
//! Connected participants share a randomly selected artwork into a single
//! well-known room; every room member receives the share, and each
//! participant's acknowledgment ("seen") is recorded against the share
//! with set semantics.
//!
//! ## Architecture
//!
//! ```text
//! atelier-server
//!   ├─ Server          (TCP accept loop, one task per connection)
//!   ├─ AppState        (injectable shared context)
//!   ├─ IdentityBinder  (connection → durable identity, guest creation)
//!   ├─ RoomRegistry    (membership + snapshot fan-out)
//!   ├─ BroadcastService(select artwork, persist message, fan out)
//!   └─ AckTracker      (idempotent seen-set updates)
//! ```
//!
//! The directory behind it all is `atelier-core`'s [`Directory`] contract;
//! wire payloads live in `atelier-proto`.
//!
//! [`Directory`]: atelier_core::Directory

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod ack;
mod binder;
mod broadcast;
mod connection;
mod error;
mod registry;
mod seed;
mod server;
mod state;

pub use ack::AckTracker;
pub use binder::IdentityBinder;
pub use broadcast::BroadcastService;
pub use error::ServerError;
pub use registry::{ConnectionId, MAIN_ROOM, OutboundRx, OutboundTx, RoomRegistry};
pub use seed::{load_manifest, seed_directory};
pub use server::{Server, ServerConfig};
pub use state::AppState;
