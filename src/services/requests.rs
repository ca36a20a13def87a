//! Item request board

use std::sync::Arc;

use validator::Validate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{request::CreateItemRequest, ItemRequest, ItemRequestView, NewItemRequest},
    repository::{PageRequest, Store},
};

#[derive(Clone)]
pub struct RequestsService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl RequestsService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Post a request for an item nobody shares yet
    pub async fn create(&self, user_id: i64, request: &CreateItemRequest) -> AppResult<ItemRequestView> {
        self.ensure_user(user_id).await?;
        request.validate()?;

        let created = self
            .store
            .insert_request(&NewItemRequest {
                description: request.description.clone(),
                requester_id: user_id,
                created: self.clock.now(),
            })
            .await?;
        tracing::info!(request_id = created.id, requester_id = user_id, "Item request posted");
        Ok(ItemRequestView::new(created, Vec::new()))
    }

    /// Requests posted by `user_id`, newest first
    pub async fn list_own(&self, user_id: i64) -> AppResult<Vec<ItemRequestView>> {
        self.ensure_user(user_id).await?;
        let requests = self.store.list_requests_by_requester(user_id).await?;
        self.with_answers(requests).await
    }

    /// Requests posted by everybody but `user_id`, newest first
    pub async fn list_others(&self, user_id: i64, from: i64, size: i64) -> AppResult<Vec<ItemRequestView>> {
        self.ensure_user(user_id).await?;
        let page = PageRequest::from_offset(from, size)?;
        let requests = self.store.list_requests_by_others(user_id, page).await?;
        self.with_answers(requests).await
    }

    pub async fn get(&self, user_id: i64, request_id: i64) -> AppResult<ItemRequestView> {
        self.ensure_user(user_id).await?;
        let request = self
            .store
            .find_request(request_id)
            .await?
            .ok_or_else(|| AppError::RequestNotFound(format!("Item request {} not found", request_id)))?;
        let mut views = self.with_answers(vec![request]).await?;
        views
            .pop()
            .ok_or_else(|| AppError::Internal("item request lost while describing".to_string()))
    }

    async fn ensure_user(&self, user_id: i64) -> AppResult<()> {
        self.store
            .find_user(user_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::UserNotFound(format!("User {} not found", user_id)))
    }

    async fn with_answers(&self, requests: Vec<ItemRequest>) -> AppResult<Vec<ItemRequestView>> {
        let mut views = Vec::with_capacity(requests.len());
        for request in requests {
            let items = self.store.list_items_by_request(request.id).await?;
            views.push(ItemRequestView::new(request, items));
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FixedClock,
        models::{item::CreateItem, user::CreateUser},
        repository::MemoryStore,
    };
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn test_request_board() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2030, 2, 1, 8, 0, 0).unwrap());
        let service = RequestsService::new(store.clone(), Arc::new(clock.clone()));

        let asker = store
            .insert_user(&CreateUser { name: "Asker".into(), email: "a@example.com".into() })
            .await
            .unwrap();
        let sharer = store
            .insert_user(&CreateUser { name: "Sharer".into(), email: "s@example.com".into() })
            .await
            .unwrap();

        let first = service
            .create(asker.id, &CreateItemRequest { description: "A ladder".into() })
            .await
            .unwrap();
        clock.advance(Duration::minutes(5));
        let second = service
            .create(asker.id, &CreateItemRequest { description: "A drill".into() })
            .await
            .unwrap();

        store
            .insert_item(
                sharer.id,
                &CreateItem {
                    name: "Ladder".into(),
                    description: "Three meters".into(),
                    available: Some(true),
                    request_id: Some(first.id),
                },
            )
            .await
            .unwrap();

        let own = service.list_own(asker.id).await.unwrap();
        assert_eq!(own.iter().map(|r| r.id).collect::<Vec<_>>(), vec![second.id, first.id]);
        assert_eq!(own[1].items.len(), 1);
        assert_eq!(own[1].items[0].request_id, Some(first.id));

        assert!(service.list_others(asker.id, 0, 10).await.unwrap().is_empty());
        assert_eq!(service.list_others(sharer.id, 0, 10).await.unwrap().len(), 2);
        assert_eq!(service.list_others(sharer.id, 1, 1).await.unwrap()[0].id, first.id);

        let seen = service.get(sharer.id, first.id).await.unwrap();
        assert_eq!(seen.description, "A ladder");

        let missing = service.get(sharer.id, 42).await;
        assert!(matches!(missing, Err(AppError::RequestNotFound(_))));
        let empty = service
            .create(asker.id, &CreateItemRequest { description: String::new() })
            .await;
        assert!(matches!(empty, Err(AppError::Validation(_))));
    }
}
