//! Comments repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Comment, NewComment},
};

#[derive(Clone)]
pub struct CommentsRepository {
    pool: Pool<Postgres>,
}

impl CommentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Comments on an item, oldest first
    pub async fn list_by_item(&self, item_id: i64) -> AppResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.text, c.item_id, c.author_id, u.name AS author_name, c.created
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.item_id = $1
            ORDER BY c.created, c.id
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    pub async fn create(&self, comment: &NewComment) -> AppResult<Comment> {
        let created = sqlx::query_as::<_, Comment>(
            r#"
            WITH c AS (
                INSERT INTO comments (text, item_id, author_id, created)
                VALUES ($1, $2, $3, $4)
                RETURNING id, text, item_id, author_id, created
            )
            SELECT c.id, c.text, c.item_id, c.author_id, u.name AS author_name, c.created
            FROM c
            JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(&comment.text)
        .bind(comment.item_id)
        .bind(comment.author_id)
        .bind(comment.created)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }
}
