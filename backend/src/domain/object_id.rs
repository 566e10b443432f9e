//! Document keys and the typed identifiers built on them.
//!
//! Keys are 12 bytes rendered as 24 lowercase hexadecimal characters: a
//! big-endian seconds timestamp followed by eight random bytes.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const KEY_LEN: usize = 12;
const HEX_LEN: usize = KEY_LEN * 2;

/// Reasons a string is not a well-formed document key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectIdError {
    /// The input was empty.
    #[error("object id must not be empty")]
    Empty,
    /// The input had the wrong number of characters.
    #[error("object id must be {HEX_LEN} characters, got {len}")]
    InvalidLength { len: usize },
    /// The input contained non-hexadecimal characters.
    #[error("object id must be hexadecimal")]
    InvalidHex,
}

/// A document-database key.
///
/// # Examples
/// ```
/// use listings_backend::domain::ObjectId;
///
/// let id: ObjectId = "64b7f0c2a1b2c3d4e5f60718".parse().expect("valid key");
/// assert_eq!(id.to_string(), "64b7f0c2a1b2c3d4e5f60718");
/// assert!(!ObjectId::is_valid("not-an-id"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; KEY_LEN]);

impl ObjectId {
    /// Generate a fresh key stamped with the current time.
    #[must_use]
    pub fn generate() -> Self {
        let seconds = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
        let tail: [u8; 8] = rand::random();
        let mut bytes = [0_u8; KEY_LEN];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..].copy_from_slice(&tail);
        Self(bytes)
    }

    /// Parse the 24-character hexadecimal form.
    pub fn parse(raw: &str) -> Result<Self, ObjectIdError> {
        if raw.is_empty() {
            return Err(ObjectIdError::Empty);
        }
        if raw.len() != HEX_LEN {
            return Err(ObjectIdError::InvalidLength { len: raw.len() });
        }
        let mut bytes = [0_u8; KEY_LEN];
        hex::decode_to_slice(raw, &mut bytes).map_err(|_| ObjectIdError::InvalidHex)?;
        Ok(Self(bytes))
    }

    /// Whether `raw` is a well-formed key.
    #[must_use]
    pub fn is_valid(raw: &str) -> bool {
        Self::parse(raw).is_ok()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Declares a typed identifier wrapping [`ObjectId`].
macro_rules! object_id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(ObjectId);

        impl $name {
            /// Generate a fresh identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(ObjectId::generate())
            }

            /// Parse the hexadecimal form.
            pub fn parse(raw: &str) -> Result<Self, ObjectIdError> {
                ObjectId::parse(raw).map(Self)
            }

            /// Underlying document key.
            #[must_use]
            pub fn as_object_id(&self) -> &ObjectId {
                &self.0
            }
        }

        impl From<ObjectId> for $name {
            fn from(value: ObjectId) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ObjectIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ObjectIdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.to_string()
            }
        }
    };
}

object_id_newtype!(
    /// Identifier of a user account.
    UserId
);

object_id_newtype!(
    /// Identifier of a listing.
    ListingId
);
