//! In-memory store adapters.
//!
//! They back the development binary and the integration suite until a
//! document database adapter is wired. State lives behind
//! `tokio::sync::RwLock` and is lost on restart.

mod listings;
mod users;

pub use listings::InMemoryListingRepository;
pub use users::{InMemoryUserRepository, MIN_HASH_COST};
