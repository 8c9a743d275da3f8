//! The directory contract.
//!
//! The directory is the system of record for identities, artworks, and
//! messages. The realtime subsystem reaches it only through this trait, so
//! the storage engine behind it stays swappable (the in-process
//! [`MemoryDirectory`](crate::MemoryDirectory) for a single-node deployment,
//! something durable later).
//!
//! Every method is a potential suspension point; callers must not hold
//! in-process locks across a call. The directory itself owns the atomicity
//! of uniqueness checks and acknowledgment set-appends.

use async_trait::async_trait;

use crate::artwork::{Artwork, ArtworkId};
use crate::identity::{Identity, IdentityId, NewIdentity};
use crate::message::{Message, MessageId};

/// Errors surfaced by [`Directory`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// The candidate username is already registered.
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// The candidate email is already registered.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// The referenced message does not exist.
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),

    /// The backing store could not be reached or failed internally.
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Narrow read/write contract over the persistent store.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Create a new identity.
    ///
    /// Uniqueness of username and email is enforced atomically here;
    /// concurrent creations with the same candidate username resolve to
    /// exactly one winner, the rest receiving
    /// [`DirectoryError::UsernameTaken`].
    async fn create_identity(&self, new: NewIdentity) -> Result<Identity, DirectoryError>;

    /// Look up an identity by its unique username.
    async fn find_identity_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Identity>, DirectoryError>;

    /// Look up an identity by id.
    async fn find_identity_by_id(
        &self,
        id: IdentityId,
    ) -> Result<Option<Identity>, DirectoryError>;

    /// Update an identity's `last_active` timestamp to now.
    ///
    /// Unknown ids are ignored; activity tracking is advisory.
    async fn touch_last_active(&self, id: IdentityId) -> Result<(), DirectoryError>;

    /// Sample one artwork uniformly at random, or `None` if the store
    /// holds no artworks.
    async fn sample_random_artwork(&self) -> Result<Option<Artwork>, DirectoryError>;

    /// Persist a new share record. The returned message's acknowledgment
    /// set already contains `sender`.
    async fn create_message(
        &self,
        sender: IdentityId,
        artwork: ArtworkId,
    ) -> Result<Message, DirectoryError>;

    /// Atomically add `identity` to the acknowledgment set of `message`.
    ///
    /// Idempotent: repeating the call for the same pair leaves the set
    /// unchanged. Fails with [`DirectoryError::MessageNotFound`] if the
    /// message does not exist.
    async fn add_acknowledgment(
        &self,
        message: MessageId,
        identity: IdentityId,
    ) -> Result<(), DirectoryError>;
}
