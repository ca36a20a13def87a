//! Item directory service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        item::{CreateItem, Item, ItemView, UpdateItem},
        BookingShort, CommentView,
    },
    repository::{PageRequest, Store},
    services::bookings::BookingsService,
};

#[derive(Clone)]
pub struct ItemsService {
    store: Arc<dyn Store>,
    bookings: BookingsService,
}

impl ItemsService {
    pub fn new(store: Arc<dyn Store>, bookings: BookingsService) -> Self {
        Self { store, bookings }
    }

    /// Create an item owned by `owner_id`
    pub async fn create(&self, owner_id: i64, item: &CreateItem) -> AppResult<ItemView> {
        self.store
            .find_user(owner_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User {} not found", owner_id)))?;
        item.validate()?;
        if let Some(request_id) = item.request_id {
            self.store.find_request(request_id).await?.ok_or_else(|| {
                AppError::RequestNotFound(format!("Item request {} not found", request_id))
            })?;
        }

        let created = self.store.insert_item(owner_id, item).await?;
        tracing::info!(item_id = created.id, owner_id, "Item created");
        Ok(ItemView::plain(created))
    }

    /// Change an item on behalf of its owner.
    ///
    /// Anyone else gets `ItemNotFound`, as if the item did not exist.
    pub async fn update(&self, user_id: i64, item_id: i64, patch: &UpdateItem) -> AppResult<ItemView> {
        let item = self.find(item_id).await?;
        if item.owner_id != user_id {
            tracing::debug!("User {} is not the owner of item {}", user_id, item_id);
            return Err(AppError::ItemNotFound(format!("Item {} not found", item_id)));
        }
        patch.validate()?;

        let updated = self
            .store
            .update_item(item_id, patch)
            .await?
            .ok_or_else(|| AppError::ItemNotFound(format!("Item {} not found", item_id)))?;
        tracing::info!(item_id, available = updated.available, "Item updated");
        self.view(user_id, updated).await
    }

    pub async fn delete(&self, item_id: i64) -> AppResult<()> {
        self.store.delete_item(item_id).await?;
        tracing::info!(item_id, "Item deleted");
        Ok(())
    }

    /// Get an item as seen by `user_id`
    pub async fn get(&self, user_id: i64, item_id: i64) -> AppResult<ItemView> {
        let item = self.find(item_id).await?;
        self.view(user_id, item).await
    }

    /// Items owned by `user_id`, with their last and next bookings
    pub async fn list_owned(&self, user_id: i64, from: i64, size: i64) -> AppResult<Vec<ItemView>> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User {} not found", user_id)))?;
        let page = PageRequest::from_offset(from, size)?;

        let items = self.store.list_items_by_owner(user_id, page).await?;
        let mut views = Vec::with_capacity(items.len());
        for item in items {
            views.push(self.view(user_id, item).await?);
        }
        Ok(views)
    }

    /// Available items matching `text`; blank text matches nothing
    pub async fn search(&self, text: &str, from: i64, size: i64) -> AppResult<Vec<ItemView>> {
        let page = PageRequest::from_offset(from, size)?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let items = self.store.search_items(text, page).await?;
        tracing::debug!(found = items.len(), "Searched items");
        Ok(items.into_iter().map(ItemView::plain).collect())
    }

    async fn find(&self, item_id: i64) -> AppResult<Item> {
        self.store
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::ItemNotFound(format!("Item {} not found", item_id)))
    }

    async fn view(&self, user_id: i64, item: Item) -> AppResult<ItemView> {
        let comments = self.store.list_comments_by_item(item.id).await?;
        let is_owner = item.owner_id == user_id;
        let item_id = item.id;

        let mut view = ItemView::plain(item);
        view.comments = comments.into_iter().map(CommentView::from).collect();
        if is_owner {
            view.last_booking = self.bookings.last(item_id).await?.map(BookingShort::from);
            view.next_booking = self.bookings.next(item_id).await?.map(BookingShort::from);
        }
        Ok(view)
    }
}
