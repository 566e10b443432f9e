//! Port for the listing store.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Listing, ListingDraft, ListingId, UserId};

/// Failures raised by listing store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingStoreError {
    /// The backing store could not be reached or failed mid-operation.
    #[error("listing store unavailable: {message}")]
    Unavailable { message: String },
    /// The listing targeted by a mutation does not exist.
    #[error("no listing with id {id}")]
    Missing { id: ListingId },
}

impl ListingStoreError {
    /// Convenience constructor for [`ListingStoreError::Unavailable`].
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Listing persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Fetch a listing by id.
    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, ListingStoreError>;

    /// All listings, oldest first.
    async fn list(&self) -> Result<Vec<Listing>, ListingStoreError>;

    /// Number of stored listings.
    async fn count(&self) -> Result<usize, ListingStoreError>;

    /// Store a new listing owned by `created_by`.
    async fn create(
        &self,
        created_by: &UserId,
        draft: ListingDraft,
    ) -> Result<Listing, ListingStoreError>;

    /// Replace the editable fields of a listing.
    async fn update(
        &self,
        id: &ListingId,
        draft: ListingDraft,
    ) -> Result<Listing, ListingStoreError>;

    /// Remove a listing, returning it.
    async fn delete(&self, id: &ListingId) -> Result<Listing, ListingStoreError>;
}
