//! In-memory [`ListingRepository`].

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ports::{ListingRepository, ListingStoreError};
use crate::domain::{Listing, ListingDraft, ListingId, UserId};

/// Process-local listing store preserving insertion order.
#[derive(Default)]
pub struct InMemoryListingRepository {
    listings: RwLock<Vec<Listing>>,
}

impl InMemoryListingRepository {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, ListingStoreError> {
        let listings = self.listings.read().await;
        Ok(listings.iter().find(|listing| &listing.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Listing>, ListingStoreError> {
        Ok(self.listings.read().await.clone())
    }

    async fn count(&self) -> Result<usize, ListingStoreError> {
        Ok(self.listings.read().await.len())
    }

    async fn create(
        &self,
        created_by: &UserId,
        draft: ListingDraft,
    ) -> Result<Listing, ListingStoreError> {
        let listing = Listing::from_draft(ListingId::generate(), *created_by, draft);
        debug!(listing_id = %listing.id, created_by = %created_by, "listing created");
        self.listings.write().await.push(listing.clone());
        Ok(listing)
    }

    async fn update(
        &self,
        id: &ListingId,
        draft: ListingDraft,
    ) -> Result<Listing, ListingStoreError> {
        let mut listings = self.listings.write().await;
        let listing = listings
            .iter_mut()
            .find(|listing| &listing.id == id)
            .ok_or(ListingStoreError::Missing { id: *id })?;
        listing.apply(draft);
        Ok(listing.clone())
    }

    async fn delete(&self, id: &ListingId) -> Result<Listing, ListingStoreError> {
        let mut listings = self.listings.write().await;
        let position = listings
            .iter()
            .position(|listing| &listing.id == id)
            .ok_or(ListingStoreError::Missing { id: *id })?;
        Ok(listings.remove(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> ListingDraft {
        ListingDraft {
            title: title.into(),
            description: "desc".into(),
            price: "10".into(),
            avatar: "data:image/png;base64,AA==".into(),
            ..ListingDraft::default()
        }
    }

    #[tokio::test]
    async fn lifecycle_create_update_delete() {
        let store = InMemoryListingRepository::new();
        let owner = UserId::generate();
        let first = store.create(&owner, draft("Bike")).await.expect("create");
        let second = store.create(&owner, draft("Lamp")).await.expect("create");

        let titles: Vec<_> = store
            .list()
            .await
            .expect("list")
            .into_iter()
            .map(|listing| listing.title)
            .collect();
        assert_eq!(titles, vec!["Bike", "Lamp"]);

        let updated = store
            .update(&first.id, draft("Red bike"))
            .await
            .expect("update");
        assert_eq!(updated.title, "Red bike");
        assert_eq!(updated.created_by, owner);

        let removed = store.delete(&second.id).await.expect("delete");
        assert_eq!(removed.id, second.id);
        assert_eq!(store.count().await.expect("count"), 1);
        assert!(store.find_by_id(&second.id).await.expect("lookup").is_none());
    }

    #[tokio::test]
    async fn missing_listings_are_reported() {
        let store = InMemoryListingRepository::new();
        let id = ListingId::generate();
        assert_eq!(
            store.delete(&id).await.expect_err("missing"),
            ListingStoreError::Missing { id }
        );
        assert_eq!(
            store.update(&id, draft("x")).await.expect_err("missing"),
            ListingStoreError::Missing { id }
        );
    }
}
