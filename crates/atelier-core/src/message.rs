//! Share records and their acknowledgment sets.
//!
//! A [`Message`] records one sharing event: who shared which artwork, when,
//! and which identities have acknowledged ("seen") it. The acknowledgment
//! set is a true set: an identity appears at most once regardless of how
//! many times it acknowledges, and the sender is a permanent member from
//! the moment of creation.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::artwork::ArtworkId;
use crate::identity::IdentityId;

/// Opaque identifier for a [`Message`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for MessageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// A persisted record of one share event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique opaque id.
    pub id: MessageId,
    /// Identity that shared the artwork.
    pub sender: IdentityId,
    /// The artwork that was shared.
    pub artwork: ArtworkId,
    /// When the share happened.
    pub timestamp: DateTime<Utc>,
    /// Identities that have acknowledged the share. Always contains
    /// `sender`.
    pub seen_by: BTreeSet<IdentityId>,
}

impl Message {
    /// Create a new share record. The sender has implicitly seen their own
    /// share, so the acknowledgment set starts as `{sender}`.
    pub fn new(sender: IdentityId, artwork: ArtworkId) -> Self {
        let mut seen_by = BTreeSet::new();
        seen_by.insert(sender);
        Self { id: MessageId::random(), sender, artwork, timestamp: Utc::now(), seen_by }
    }

    /// Record that `identity` has seen this message.
    ///
    /// Idempotent: returns `true` if the identity was newly added, `false`
    /// if it had already acknowledged.
    pub fn acknowledge(&mut self, identity: IdentityId) -> bool {
        self.seen_by.insert(identity)
    }

    /// Number of identities that have acknowledged this message.
    pub fn seen_count(&self) -> usize {
        self.seen_by.len()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn new_message_is_seen_by_sender() {
        let sender = IdentityId::random();
        let message = Message::new(sender, ArtworkId::random());
        assert!(message.seen_by.contains(&sender));
        assert_eq!(message.seen_count(), 1);
    }

    #[test]
    fn acknowledge_is_idempotent() {
        let sender = IdentityId::random();
        let viewer = IdentityId::random();
        let mut message = Message::new(sender, ArtworkId::random());

        assert!(message.acknowledge(viewer));
        assert!(!message.acknowledge(viewer));
        assert_eq!(message.seen_count(), 2);
    }

    #[test]
    fn sender_acknowledgment_is_a_no_op() {
        let sender = IdentityId::random();
        let mut message = Message::new(sender, ArtworkId::random());

        assert!(!message.acknowledge(sender));
        assert_eq!(message.seen_count(), 1);
    }

    proptest! {
        // Any interleaving of repeated acknowledgments yields exactly
        // one set member per distinct identity, plus the sender.
        #[test]
        fn seen_set_size_equals_distinct_ackers(
            ack_order in proptest::collection::vec(0usize..8, 0..64),
        ) {
            let sender = IdentityId::random();
            let viewers: Vec<IdentityId> =
                (0..8).map(|_| IdentityId::random()).collect();
            let mut message = Message::new(sender, ArtworkId::random());

            for &idx in &ack_order {
                message.acknowledge(viewers[idx]);
            }

            let distinct: std::collections::BTreeSet<usize> =
                ack_order.iter().copied().collect();
            prop_assert_eq!(message.seen_count(), distinct.len() + 1);
            prop_assert!(message.seen_by.contains(&sender));
        }
    }
}
