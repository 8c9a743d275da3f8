//! Inbound and outbound event definitions.
//!
//! Wire format: `{"event": <name>, "data": <payload>}`, one JSON object
//! per line. Events without a payload omit the `data` key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events a client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Request that a random artwork be shared into the room.
    SendArt,
    /// Acknowledge that the sender has seen a message.
    MarkSeen(MarkSeen),
}

/// Payload for [`ClientEvent::MarkSeen`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkSeen {
    /// Opaque id of the message being acknowledged.
    pub message_id: String,
}

/// Events the server sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Sent to the connecting client only, on successful connect.
    Status(StatusPayload),
    /// Broadcast to the room when an artwork is shared.
    NewArt(NewArtPayload),
    /// Sent to the originating connection only, never broadcast.
    Error(ErrorPayload),
}

/// Connection status notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    /// Human-readable status line.
    pub message: String,
    /// When the status was produced.
    pub timestamp: DateTime<Utc>,
}

/// A newly shared artwork, fanned out to every room member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArtPayload {
    /// Id of the persisted share record.
    pub message_id: String,
    /// Id of the sharing identity.
    pub user_id: String,
    /// Sender's unique username.
    pub username: String,
    /// Sender's display name.
    pub display_name: String,
    /// The shared artwork.
    pub artwork: ArtworkRef,
    /// When the share was persisted.
    pub timestamp: DateTime<Utc>,
}

/// Artwork fields embedded in a [`NewArtPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkRef {
    /// Opaque artwork id.
    pub id: String,
    /// Artwork title.
    pub title: String,
    /// Path or URL to the artwork content.
    pub file_path: String,
}

/// Error notice for the originating connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Human-readable description of the failure.
    pub message: String,
    /// When the failure was observed.
    pub timestamp: DateTime<Utc>,
}

impl ErrorPayload {
    /// Build an error notice timestamped now.
    pub fn now(message: impl Into<String>) -> Self {
        Self { message: message.into(), timestamp: Utc::now() }
    }
}

impl StatusPayload {
    /// Build a status notice timestamped now.
    pub fn now(message: impl Into<String>) -> Self {
        Self { message: message.into(), timestamp: Utc::now() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_art_wire_shape() {
        let parsed: ClientEvent = serde_json::from_str(r#"{"event":"send_art"}"#).unwrap();
        assert_eq!(parsed, ClientEvent::SendArt);
    }

    #[test]
    fn mark_seen_wire_shape() {
        let raw = r#"{"event":"mark_seen","data":{"message_id":"abc-123"}}"#;
        let parsed: ClientEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed, ClientEvent::MarkSeen(MarkSeen { message_id: "abc-123".into() }));
    }

    #[test]
    fn mark_seen_requires_message_id() {
        let raw = r#"{"event":"mark_seen","data":{}}"#;
        assert!(serde_json::from_str::<ClientEvent>(raw).is_err());
    }

    #[test]
    fn unknown_event_is_rejected() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"upload"}"#).is_err());
    }

    #[test]
    fn new_art_serializes_with_nested_artwork() {
        let event = ServerEvent::NewArt(NewArtPayload {
            message_id: "m1".into(),
            user_id: "u1".into(),
            username: "guest_1".into(),
            display_name: "Guest User".into(),
            artwork: ArtworkRef {
                id: "a1".into(),
                title: "Water Lilies".into(),
                file_path: "art/water_lilies.jpg".into(),
            },
            timestamp: "2026-01-02T03:04:05Z".parse().unwrap(),
        });

        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "new_art");
        assert_eq!(json["data"]["artwork"]["title"], "Water Lilies");
        assert_eq!(json["data"]["timestamp"], "2026-01-02T03:04:05Z");
    }

    #[test]
    fn status_timestamp_is_rfc3339() {
        let event = ServerEvent::Status(StatusPayload {
            message: "Connected to chat server".into(),
            timestamp: "2026-01-02T03:04:05Z".parse().unwrap(),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("2026-01-02T03:04:05Z"), "{json}");
    }

    #[test]
    fn server_event_round_trips() {
        let event = ServerEvent::Error(ErrorPayload::now("No artwork found in the database"));
        let json = serde_json::to_string(&event).unwrap();
        let back: ServerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
