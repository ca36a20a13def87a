//! Item comment endpoint

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{comment::CreateComment, CommentView},
    AppState,
};

use super::{AppJson, AppPath, SharerUserId};

/// Comment on an item after a finished booking of it
#[utoipa::path(
    post,
    path = "/items/{id}/comment",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Comment author"),
        ("id" = i64, Path, description = "Item ID")
    ),
    request_body = CreateComment,
    responses(
        (status = 200, description = "Comment added", body = CommentView),
        (status = 400, description = "Blank text or no finished booking of the item"),
        (status = 404, description = "User or item not found")
    )
)]
pub async fn create_comment(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    AppPath(item_id): AppPath<i64>,
    AppJson(comment): AppJson<CreateComment>,
) -> AppResult<Json<CommentView>> {
    let created = state.services.comments.create(user_id, item_id, &comment).await?;
    Ok(Json(created))
}
