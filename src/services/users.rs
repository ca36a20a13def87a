//! User directory service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
    repository::Store,
};

#[derive(Clone)]
pub struct UsersService {
    store: Arc<dyn Store>,
}

impl UsersService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, user: &CreateUser) -> AppResult<User> {
        user.validate()?;
        let created = self.store.insert_user(user).await?;
        tracing::info!(user_id = created.id, "User created");
        Ok(created)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User {} not found", id)))
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.store.list_users().await
    }

    /// Change a user's name and/or email
    pub async fn update(&self, id: i64, user: &UpdateUser) -> AppResult<User> {
        user.validate()?;
        let updated = self
            .store
            .update_user(id, user)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User {} not found", id)))?;
        tracing::info!(user_id = id, "User updated");
        Ok(updated)
    }

    /// Delete a user and everything attached to them
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.store.delete_user(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}
