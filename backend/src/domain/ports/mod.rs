//! Driven ports: the stores the request pipeline consults.
//!
//! Validation rules and handlers depend on these traits only, so tests can
//! swap in mocks or the in-memory adapters from
//! [`crate::outbound::memory`].

mod listing_repository;
mod user_repository;

#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{ListingRepository, ListingStoreError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserStoreError};
