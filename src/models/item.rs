//! Shared item model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{booking::BookingShort, comment::CommentView};

/// Item model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    /// Request this item was shared in answer to
    pub request_id: Option<i64>,
}

/// Short item representation embedded in bookings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ItemShort {
    pub id: i64,
    pub name: String,
}

impl From<&Item> for ItemShort {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
        }
    }
}

/// Create item request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItem {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,
    #[validate(required(message = "Availability must be set"))]
    pub available: Option<bool>,
    #[serde(default)]
    pub request_id: Option<i64>,
}

/// Partial item update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateItem {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,
    pub available: Option<bool>,
}

impl UpdateItem {
    /// Apply the present fields to `item`
    pub fn apply(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(available) = self.available {
            item.available = available;
        }
    }
}

/// Item as shown to a user.
///
/// `last_booking` and `next_booking` are only filled in for the owner.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
    pub last_booking: Option<BookingShort>,
    pub next_booking: Option<BookingShort>,
    pub comments: Vec<CommentView>,
}

impl ItemView {
    pub fn plain(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            owner_id: item.owner_id,
            request_id: item.request_id,
            last_booking: None,
            next_booking: None,
            comments: Vec::new(),
        }
    }
}
