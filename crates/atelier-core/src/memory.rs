//! In-process directory implementation.
//!
//! `MemoryDirectory` is the system of record for a single-node deployment
//! and the backing store for tests. All state lives behind one mutex; no
//! lock is held across an await point because every operation completes
//! synchronously once the lock is taken.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::IteratorRandom;

use crate::artwork::{Artwork, ArtworkId, NewArtwork};
use crate::directory::{Directory, DirectoryError};
use crate::identity::{Identity, IdentityId, NewIdentity};
use crate::message::{Message, MessageId};

#[derive(Default)]
struct Inner {
    identities: HashMap<IdentityId, Identity>,
    by_username: HashMap<String, IdentityId>,
    by_email: HashMap<String, IdentityId>,
    artworks: HashMap<ArtworkId, Artwork>,
    messages: HashMap<MessageId, Message>,
}

/// In-memory [`Directory`] implementation.
#[derive(Default)]
pub struct MemoryDirectory {
    inner: Mutex<Inner>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock means a panic mid-mutation elsewhere; the data
        // here is all plain maps, so recover the guard and keep serving.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert an artwork (seeding path; not part of the [`Directory`]
    /// contract since the realtime subsystem only reads artworks).
    pub fn insert_artwork(&self, new: NewArtwork) -> Artwork {
        let artwork = Artwork {
            id: ArtworkId::random(),
            title: new.title,
            file_path: new.file_path,
            created_at: Utc::now(),
        };
        self.lock().artworks.insert(artwork.id, artwork.clone());
        artwork
    }

    /// Fetch a message by id. Test and inspection helper.
    pub fn message(&self, id: MessageId) -> Option<Message> {
        self.lock().messages.get(&id).cloned()
    }

    /// Number of persisted messages.
    pub fn message_count(&self) -> usize {
        self.lock().messages.len()
    }

    /// Number of registered identities.
    pub fn identity_count(&self) -> usize {
        self.lock().identities.len()
    }
}

impl std::fmt::Debug for MemoryDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("MemoryDirectory")
            .field("identities", &inner.identities.len())
            .field("artworks", &inner.artworks.len())
            .field("messages", &inner.messages.len())
            .finish()
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn create_identity(&self, new: NewIdentity) -> Result<Identity, DirectoryError> {
        let mut inner = self.lock();

        if inner.by_username.contains_key(&new.username) {
            return Err(DirectoryError::UsernameTaken(new.username));
        }
        if inner.by_email.contains_key(&new.email) {
            return Err(DirectoryError::EmailTaken(new.email));
        }

        let now = Utc::now();
        let identity = Identity {
            id: IdentityId::random(),
            display_name: new.effective_display_name().to_owned(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            created_at: now,
            last_active: now,
        };

        inner.by_username.insert(identity.username.clone(), identity.id);
        inner.by_email.insert(identity.email.clone(), identity.id);
        inner.identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn find_identity_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Identity>, DirectoryError> {
        let inner = self.lock();
        let id = inner.by_username.get(username);
        Ok(id.and_then(|id| inner.identities.get(id).cloned()))
    }

    async fn find_identity_by_id(
        &self,
        id: IdentityId,
    ) -> Result<Option<Identity>, DirectoryError> {
        Ok(self.lock().identities.get(&id).cloned())
    }

    async fn touch_last_active(&self, id: IdentityId) -> Result<(), DirectoryError> {
        if let Some(identity) = self.lock().identities.get_mut(&id) {
            identity.last_active = Utc::now();
        }
        Ok(())
    }

    async fn sample_random_artwork(&self) -> Result<Option<Artwork>, DirectoryError> {
        let inner = self.lock();
        Ok(inner.artworks.values().choose(&mut rand::thread_rng()).cloned())
    }

    async fn create_message(
        &self,
        sender: IdentityId,
        artwork: ArtworkId,
    ) -> Result<Message, DirectoryError> {
        let message = Message::new(sender, artwork);
        self.lock().messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn add_acknowledgment(
        &self,
        message: MessageId,
        identity: IdentityId,
    ) -> Result<(), DirectoryError> {
        let mut inner = self.lock();
        let record =
            inner.messages.get_mut(&message).ok_or(DirectoryError::MessageNotFound(message))?;
        if record.acknowledge(identity) {
            tracing::trace!(%message, %identity, "acknowledgment recorded");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(n: u32) -> NewIdentity {
        NewIdentity {
            username: format!("guest_{n}"),
            email: format!("guest_{n}@guest.invalid"),
            password_hash: "!".into(),
            display_name: "Guest User".into(),
        }
    }

    #[tokio::test]
    async fn create_identity_enforces_username_uniqueness() {
        let dir = MemoryDirectory::new();
        dir.create_identity(guest(1)).await.unwrap();

        let mut dup = guest(1);
        dup.email = "other@guest.invalid".into();
        let err = dir.create_identity(dup).await.unwrap_err();
        assert_eq!(err, DirectoryError::UsernameTaken("guest_1".into()));
    }

    #[tokio::test]
    async fn create_identity_enforces_email_uniqueness() {
        let dir = MemoryDirectory::new();
        dir.create_identity(guest(1)).await.unwrap();

        let mut dup = guest(2);
        dup.email = "guest_1@guest.invalid".into();
        let err = dir.create_identity(dup).await.unwrap_err();
        assert!(matches!(err, DirectoryError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn find_identity_by_username_and_id() {
        let dir = MemoryDirectory::new();
        let created = dir.create_identity(guest(1)).await.unwrap();

        let by_name = dir.find_identity_by_username("guest_1").await.unwrap();
        assert_eq!(by_name.as_ref(), Some(&created));

        let by_id = dir.find_identity_by_id(created.id).await.unwrap();
        assert_eq!(by_id, Some(created));

        assert!(dir.find_identity_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn touch_last_active_advances_timestamp() {
        let dir = MemoryDirectory::new();
        let created = dir.create_identity(guest(1)).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        dir.touch_last_active(created.id).await.unwrap();

        let refreshed = dir.find_identity_by_id(created.id).await.unwrap().unwrap();
        assert!(refreshed.last_active > created.last_active);

        // Unknown ids are ignored.
        dir.touch_last_active(IdentityId::random()).await.unwrap();
    }

    #[tokio::test]
    async fn sampling_empty_directory_yields_none() {
        let dir = MemoryDirectory::new();
        assert!(dir.sample_random_artwork().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sampling_returns_a_seeded_artwork() {
        let dir = MemoryDirectory::new();
        let seeded = dir.insert_artwork(NewArtwork {
            title: "Starry Night".into(),
            file_path: "art/starry_night.jpg".into(),
        });

        let sampled = dir.sample_random_artwork().await.unwrap().unwrap();
        assert_eq!(sampled, seeded);
    }

    #[tokio::test]
    async fn created_message_is_seen_by_sender() {
        let dir = MemoryDirectory::new();
        let sender = IdentityId::random();
        let message = dir.create_message(sender, ArtworkId::random()).await.unwrap();

        assert!(message.seen_by.contains(&sender));
        let stored = dir.message(message.id).unwrap();
        assert_eq!(stored, message);
    }

    #[tokio::test]
    async fn add_acknowledgment_is_idempotent() {
        let dir = MemoryDirectory::new();
        let sender = IdentityId::random();
        let viewer = IdentityId::random();
        let message = dir.create_message(sender, ArtworkId::random()).await.unwrap();

        dir.add_acknowledgment(message.id, viewer).await.unwrap();
        dir.add_acknowledgment(message.id, viewer).await.unwrap();

        assert_eq!(dir.message(message.id).unwrap().seen_count(), 2);
    }

    #[tokio::test]
    async fn add_acknowledgment_rejects_unknown_message() {
        let dir = MemoryDirectory::new();
        let missing = MessageId::random();
        let err = dir.add_acknowledgment(missing, IdentityId::random()).await.unwrap_err();
        assert_eq!(err, DirectoryError::MessageNotFound(missing));
    }
}
