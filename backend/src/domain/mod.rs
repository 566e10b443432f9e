//! Domain primitives and ports.
//!
//! Purpose: strongly typed identifiers, accounts, listings and the error
//! taxonomy shared by the HTTP pipeline. Nothing here depends on Actix.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: failure payload and category.
//! - [`Identity`] / [`Role`]: verified caller of one request.
//! - [`ObjectId`], [`UserId`], [`ListingId`]: document keys.
//! - [`UserAccount`], [`Listing`]: stored records.
//! - [`ports`]: store abstractions.

pub mod error;
pub mod identity;
pub mod listing;
pub mod object_id;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::error::{Error, ErrorCode};
pub use self::identity::{Identity, Role, UnknownRole};
pub use self::listing::{Listing, ListingDraft};
pub use self::object_id::{ListingId, ObjectId, ObjectIdError, UserId};
pub use self::trace_id::TraceId;
pub use self::user::{NewUser, ProfileUpdate, UserAccount};

/// Response header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Convenient result alias for fallible request handling.
pub type ApiResult<T> = Result<T, Error>;
