//! Item endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::item::{CreateItem, ItemView, UpdateItem},
    AppState,
};

use super::{AppJson, AppPath, AppQuery, Paging, SharerUserId};

/// Item search parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Text looked up in names and descriptions, ignoring case
    #[serde(default)]
    pub text: String,
    /// Index of the first wanted row (default: 0)
    pub from: Option<i64>,
    /// Rows per page (default from configuration)
    pub size: Option<i64>,
}

/// List items owned by the requester
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Item owner"),
        Paging
    ),
    responses(
        (status = 200, description = "Owned items with their last and next bookings", body = Vec<ItemView>),
        (status = 400, description = "Invalid paging"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    AppQuery(paging): AppQuery<Paging>,
) -> AppResult<Json<Vec<ItemView>>> {
    let (from, size) = paging.resolve(state.config.pagination.default_size);
    let items = state.services.items.list_owned(user_id, from, size).await?;
    Ok(Json(items))
}

/// Search available items
#[utoipa::path(
    get,
    path = "/items/search",
    tag = "items",
    params(SearchQuery),
    responses(
        (status = 200, description = "Available items matching the text; empty for blank text", body = Vec<ItemView>),
        (status = 400, description = "Invalid paging")
    )
)]
pub async fn search_items(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> AppResult<Json<Vec<ItemView>>> {
    let from = query.from.unwrap_or(0);
    let size = query.size.unwrap_or(state.config.pagination.default_size);
    let items = state.services.items.search(&query.text, from, size).await?;
    Ok(Json(items))
}

/// Get item details by ID
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user"),
        ("id" = i64, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item details; bookings are shown to the owner only", body = ItemView),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ItemView>> {
    let item = state.services.items.get(user_id, id).await?;
    Ok(Json(item))
}

/// Share a new item
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    params(("X-Sharer-User-Id" = i64, Header, description = "Owner of the new item")),
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = ItemView),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Owner or answered request not found")
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    AppJson(item): AppJson<CreateItem>,
) -> AppResult<(StatusCode, Json<ItemView>)> {
    let created = state.services.items.create(user_id, &item).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Change name, description or availability of an item
#[utoipa::path(
    patch,
    path = "/items/{id}",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Item owner"),
        ("id" = i64, Path, description = "Item ID")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = ItemView),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Item not found or requester is not the owner")
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<UpdateItem>,
) -> AppResult<Json<ItemView>> {
    let updated = state.services.items.update(user_id, id, &patch).await?;
    Ok(Json(updated))
}

/// Delete an item with its bookings and comments
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "items",
    params(("id" = i64, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item deleted (or already absent)")
    )
)]
pub async fn delete_item(State(state): State<AppState>, AppPath(id): AppPath<i64>) -> AppResult<StatusCode> {
    state.services.items.delete(id).await?;
    Ok(StatusCode::OK)
}
