//! Items repository for database operations

use sqlx::{postgres::PgExecutor, Pool, Postgres};

use crate::{
    error::AppResult,
    models::item::{CreateItem, Item, UpdateItem},
};

use super::PageRequest;

const ITEM_COLUMNS: &str = "id, name, description, available, owner_id, request_id";

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get item by ID
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Item>> {
        find_by_id(&self.pool, id).await
    }

    /// Items owned by a user, oldest first
    pub async fn list_by_owner(&self, owner_id: i64, page: PageRequest) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items WHERE owner_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
            ITEM_COLUMNS
        ))
        .bind(owner_id)
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Items shared in answer to a request
    pub async fn list_by_request(&self, request_id: i64) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items WHERE request_id = $1 ORDER BY id",
            ITEM_COLUMNS
        ))
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Available items whose name or description contains `text`, ignoring case
    pub async fn search(&self, text: &str, page: PageRequest) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            r#"
            SELECT {}
            FROM items
            WHERE available AND (name ILIKE $1 OR description ILIKE $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
            ITEM_COLUMNS
        ))
        .bind(like_pattern(text))
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Create an item for an owner
    pub async fn create(&self, owner_id: i64, item: &CreateItem) -> AppResult<Item> {
        let created = sqlx::query_as::<_, Item>(&format!(
            r#"
            INSERT INTO items (name, description, available, owner_id, request_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.available.unwrap_or(false))
        .bind(owner_id)
        .bind(item.request_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update the given fields of an item
    pub async fn update(&self, id: i64, item: &UpdateItem) -> AppResult<Option<Item>> {
        let updated = sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                available = COALESCE($3, available)
            WHERE id = $4
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.available)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    /// Delete an item with its bookings and comments
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            tracing::debug!("Item {} was already absent", id);
        }
        Ok(())
    }
}

/// Get item by ID on any executor (pool or open transaction)
pub async fn find_by_id<'e, E>(executor: E, id: i64) -> AppResult<Option<Item>>
where
    E: PgExecutor<'e>,
{
    let item = sqlx::query_as::<_, Item>(&format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(item)
}

/// `%text%` with LIKE wildcards in `text` matched literally
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
