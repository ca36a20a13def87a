//! Item requests repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{ItemRequest, NewItemRequest},
};

use super::PageRequest;

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<ItemRequest>> {
        let request = sqlx::query_as::<_, ItemRequest>(
            "SELECT id, description, requester_id, created FROM item_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    /// Requests made by a user, newest first
    pub async fn list_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>> {
        let requests = sqlx::query_as::<_, ItemRequest>(
            r#"
            SELECT id, description, requester_id, created
            FROM item_requests
            WHERE requester_id = $1
            ORDER BY created DESC, id DESC
            "#,
        )
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    /// Requests made by everybody else, newest first
    pub async fn list_by_others(&self, user_id: i64, page: PageRequest) -> AppResult<Vec<ItemRequest>> {
        let requests = sqlx::query_as::<_, ItemRequest>(
            r#"
            SELECT id, description, requester_id, created
            FROM item_requests
            WHERE requester_id <> $1
            ORDER BY created DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn create(&self, request: &NewItemRequest) -> AppResult<ItemRequest> {
        let created = sqlx::query_as::<_, ItemRequest>(
            r#"
            INSERT INTO item_requests (description, requester_id, created)
            VALUES ($1, $2, $3)
            RETURNING id, description, requester_id, created
            "#,
        )
        .bind(&request.description)
        .bind(request.requester_id)
        .bind(request.created)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }
}
