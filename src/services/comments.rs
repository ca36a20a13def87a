//! Comments on items, open to users whose booking of the item is over

use std::sync::Arc;

use validator::Validate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{comment::CreateComment, CommentView, NewComment},
    repository::Store,
    services::bookings::BookingsService,
};

#[derive(Clone)]
pub struct CommentsService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    bookings: BookingsService,
}

impl CommentsService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, bookings: BookingsService) -> Self {
        Self { store, clock, bookings }
    }

    /// Leave a comment on `item_id` as `user_id`.
    ///
    /// The author must have an approved booking of the item that has ended.
    pub async fn create(&self, user_id: i64, item_id: i64, comment: &CreateComment) -> AppResult<CommentView> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User {} not found", user_id)))?;
        self.store
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::ItemNotFound(format!("Item {} not found", item_id)))?;
        comment.validate()?;
        let text = comment.text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Text must not be blank".to_string()));
        }

        if !self.bookings.has_finished_booking(user_id, item_id).await? {
            tracing::debug!("User {} has no finished booking of item {}", user_id, item_id);
            return Err(AppError::Validation(format!(
                "User {} has not finished a booking of item {}",
                user_id, item_id
            )));
        }

        let created = self
            .store
            .insert_comment(&NewComment {
                text: text.to_string(),
                item_id,
                author_id: user_id,
                created: self.clock.now(),
            })
            .await?;
        tracing::info!(comment_id = created.id, item_id, author_id = user_id, "Comment added");
        Ok(CommentView::from(created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FixedClock,
        models::{item::CreateItem, user::CreateUser, BookingStatus, NewBooking},
        repository::MemoryStore,
    };
    use chrono::{Duration, TimeZone, Utc};
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_only_finished_bookers_comment() {
        let store = MemoryStore::new();
        let now = Utc.with_ymd_and_hms(2030, 5, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::new(now);
        let shared: Arc<dyn Store> = Arc::new(store.clone());
        let bookings = BookingsService::new(shared.clone(), Arc::new(clock.clone()));
        let service = CommentsService::new(shared, Arc::new(clock.clone()), bookings);

        let owner = store
            .insert_user(&CreateUser { name: "Owner".into(), email: "o@example.com".into() })
            .await
            .unwrap();
        let booker = store
            .insert_user(&CreateUser { name: "Booker".into(), email: "b@example.com".into() })
            .await
            .unwrap();
        let item = store
            .insert_item(
                owner.id,
                &CreateItem {
                    name: "Kayak".into(),
                    description: "Single".into(),
                    available: Some(true),
                    request_id: None,
                },
            )
            .await
            .unwrap();
        let text = CreateComment { text: "Dry and fast".into() };

        // Nothing booked yet
        assert_err!(service.create(booker.id, item.id, &text).await);

        store
            .insert_raw_booking(
                &NewBooking {
                    start: now + Duration::hours(1),
                    end: now + Duration::hours(5),
                    item_id: item.id,
                    booker_id: booker.id,
                },
                BookingStatus::Approved,
            )
            .await;
        // Booked but not over yet
        let early = service.create(booker.id, item.id, &text).await;
        assert!(matches!(early, Err(AppError::Validation(_))));

        clock.advance(Duration::hours(6));
        let comment = assert_ok!(service.create(booker.id, item.id, &text).await);
        assert_eq!(comment.author_name, "Booker");
        assert_eq!(comment.created, (now + Duration::hours(6)).naive_utc());

        let blank = service.create(booker.id, item.id, &CreateComment { text: "  ".into() }).await;
        assert!(matches!(blank, Err(AppError::Validation(_))));

        let missing_item = service.create(booker.id, 99, &text).await;
        assert!(matches!(missing_item, Err(AppError::ItemNotFound(_))));
        let missing_user = service.create(99, item.id, &text).await;
        assert!(matches!(missing_user, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_rejected_booking_does_not_count() {
        let store = MemoryStore::new();
        let now = Utc.with_ymd_and_hms(2030, 5, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(now));
        let shared: Arc<dyn Store> = Arc::new(store.clone());
        let bookings = BookingsService::new(shared.clone(), clock.clone());
        let service = CommentsService::new(shared, clock, bookings);

        let owner = store
            .insert_user(&CreateUser { name: "Owner".into(), email: "o@example.com".into() })
            .await
            .unwrap();
        let booker = store
            .insert_user(&CreateUser { name: "Booker".into(), email: "b@example.com".into() })
            .await
            .unwrap();
        let item = store
            .insert_item(
                owner.id,
                &CreateItem {
                    name: "Kayak".into(),
                    description: "Single".into(),
                    available: Some(true),
                    request_id: None,
                },
            )
            .await
            .unwrap();
        store
            .insert_raw_booking(
                &NewBooking {
                    start: now - Duration::hours(5),
                    end: now - Duration::hours(1),
                    item_id: item.id,
                    booker_id: booker.id,
                },
                BookingStatus::Rejected,
            )
            .await;

        let result = service
            .create(booker.id, item.id, &CreateComment { text: "Nice".into() })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
