//! Item request board endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{request::CreateItemRequest, ItemRequestView},
    AppState,
};

use super::{AppJson, AppPath, AppQuery, Paging, SharerUserId};

/// Ask for an item nobody shares yet
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    params(("X-Sharer-User-Id" = i64, Header, description = "Requester")),
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Request posted", body = ItemRequestView),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "User not found")
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    AppJson(request): AppJson<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<ItemRequestView>)> {
    let created = state.services.requests.create(user_id, &request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List the requester's own requests with the items shared in answer
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    params(("X-Sharer-User-Id" = i64, Header, description = "Requester")),
    responses(
        (status = 200, description = "Own requests, newest first", body = Vec<ItemRequestView>),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_own_requests(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
) -> AppResult<Json<Vec<ItemRequestView>>> {
    let requests = state.services.requests.list_own(user_id).await?;
    Ok(Json(requests))
}

/// List requests posted by other users
#[utoipa::path(
    get,
    path = "/requests/all",
    tag = "requests",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user"),
        Paging
    ),
    responses(
        (status = 200, description = "Other users' requests, newest first", body = Vec<ItemRequestView>),
        (status = 400, description = "Invalid paging"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_all_requests(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    AppQuery(paging): AppQuery<Paging>,
) -> AppResult<Json<Vec<ItemRequestView>>> {
    let (from, size) = paging.resolve(state.config.pagination.default_size);
    let requests = state.services.requests.list_others(user_id, from, size).await?;
    Ok(Json(requests))
}

/// Get a request by ID
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user"),
        ("id" = i64, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request with its answers", body = ItemRequestView),
        (status = 404, description = "User or request not found")
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ItemRequestView>> {
    let request = state.services.requests.get(user_id, id).await?;
    Ok(Json(request))
}
