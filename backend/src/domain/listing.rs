//! Classified listings.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{ListingId, UserId};

/// A stored listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub price: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub created_by: UserId,
}

impl Listing {
    /// Materialise a draft under a fresh id.
    #[must_use]
    pub fn from_draft(id: ListingId, created_by: UserId, draft: ListingDraft) -> Self {
        let mut listing = Self {
            id,
            title: String::new(),
            description: String::new(),
            price: String::new(),
            location: String::new(),
            avatar: String::new(),
            images: Vec::new(),
            created_by,
        };
        listing.apply(draft);
        listing
    }

    /// Overwrite the editable fields with a draft. An empty avatar in the
    /// draft keeps the stored one.
    pub fn apply(&mut self, draft: ListingDraft) {
        let ListingDraft {
            title,
            description,
            price,
            location,
            avatar,
            images,
        } = draft;
        self.title = title;
        self.description = description;
        self.price = price;
        self.location = location;
        if !avatar.is_empty() {
            self.avatar = avatar;
        }
        self.images = images;
    }
}

/// Editable listing fields as submitted by clients.
///
/// `price` accepts a JSON string or number and is kept in its textual form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "price_text")]
    pub price: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub images: Vec<String>,
}

fn price_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "price must be a string or number, got {other}"
        ))),
    }
}
