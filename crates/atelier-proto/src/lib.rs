//! Typed realtime event payloads.
//!
//! One struct or enum variant per event name, with required fields checked
//! at deserialization time rather than spelled out as ad-hoc dictionaries.
//! The transport serializes these as JSON; ids are opaque strings and
//! timestamps are RFC 3339.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod events;

pub use events::{ArtworkRef, ClientEvent, ErrorPayload, MarkSeen, NewArtPayload, ServerEvent, StatusPayload};
