//! Item requests: users asking for something nobody shares yet

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::item::Item;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ItemRequest {
    pub id: i64,
    pub description: String,
    pub requester_id: i64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewItemRequest {
    pub description: String,
    pub requester_id: i64,
    pub created: DateTime<Utc>,
}

/// Create item request body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,
}

/// Item shared in answer to a request
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemAnswer {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

impl From<Item> for ItemAnswer {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            owner_id: item.owner_id,
            request_id: item.request_id,
        }
    }
}

/// Item request with the items shared in answer to it
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestView {
    pub id: i64,
    pub description: String,
    #[schema(value_type = String, example = "2030-01-01T10:00:00")]
    pub created: NaiveDateTime,
    pub items: Vec<ItemAnswer>,
}

impl ItemRequestView {
    pub fn new(request: ItemRequest, items: Vec<Item>) -> Self {
        Self {
            id: request.id,
            description: request.description,
            created: request.created.naive_utc(),
            items: items.into_iter().map(ItemAnswer::from).collect(),
        }
    }
}
