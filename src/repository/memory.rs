//! In-memory store used by tests and by `storage.backend = "memory"`

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::{
    error::{AppError, AppResult},
    models::{
        item::{CreateItem, UpdateItem},
        user::{CreateUser, UpdateUser},
        Booking, BookingStatus, Comment, Item, ItemRequest, NewBooking, NewComment, NewItemRequest, User,
    },
};

use super::{BookingQuery, BookingScope, PageRequest, Store, UnitOfWork};

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    items: BTreeMap<i64, Item>,
    bookings: BTreeMap<i64, Booking>,
    comments: BTreeMap<i64, Comment>,
    requests: BTreeMap<i64, ItemRequest>,
    last_user_id: i64,
    last_item_id: i64,
    last_booking_id: i64,
    last_comment_id: i64,
    last_request_id: i64,
}

impl MemoryState {
    fn in_scope(&self, scope: BookingScope, booking: &Booking) -> bool {
        match scope {
            BookingScope::Booker(user_id) => booking.booker_id == user_id,
            BookingScope::Item(item_id) => booking.item_id == item_id,
            BookingScope::BookerOnItem { booker_id, item_id } => {
                booking.booker_id == booker_id && booking.item_id == item_id
            }
            BookingScope::Owner(user_id) => self
                .items
                .get(&booking.item_id)
                .map_or(false, |item| item.owner_id == user_id),
        }
    }

    /// Drop an item and whatever hangs off it
    fn cascade_item(&mut self, item_id: i64) {
        self.items.remove(&item_id);
        self.bookings.retain(|_, b| b.item_id != item_id);
        self.comments.retain(|_, c| c.item_id != item_id);
    }
}

/// Store keeping everything in process memory.
///
/// Readers share the state; a unit of work holds it exclusively until it is
/// committed or dropped.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a user without touching what references it
    #[cfg(test)]
    pub async fn remove_user(&self, user_id: i64) {
        self.state.write().await.users.remove(&user_id);
    }

    /// Remove an item without touching what references it
    #[cfg(test)]
    pub async fn remove_item(&self, item_id: i64) {
        self.state.write().await.items.remove(&item_id);
    }

    /// Insert a booking as is, bypassing lifecycle checks
    #[cfg(test)]
    pub async fn insert_raw_booking(&self, booking: &NewBooking, status: BookingStatus) -> Booking {
        let mut state = self.state.write().await;
        state.last_booking_id += 1;
        let stored = Booking {
            id: state.last_booking_id,
            start: booking.start,
            end: booking.end,
            item_id: booking.item_id,
            booker_id: booking.booker_id,
            status,
        };
        state.bookings.insert(stored.id, stored.clone());
        stored
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let guard = self.state.clone().write_owned().await;
        let last_booking_id = guard.last_booking_id;
        Ok(Box::new(MemoryUnitOfWork {
            guard,
            staged: BTreeMap::new(),
            last_booking_id,
        }))
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn insert_user(&self, user: &CreateUser) -> AppResult<User> {
        let mut state = self.state.write().await;
        state.last_user_id += 1;
        let created = User {
            id: state.last_user_id,
            name: user.name.clone(),
            email: user.email.clone(),
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_user(&self, id: i64, user: &UpdateUser) -> AppResult<Option<User>> {
        let mut state = self.state.write().await;
        let Some(stored) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &user.name {
            stored.name = name.clone();
        }
        if let Some(email) = &user.email {
            stored.email = email.clone();
        }
        let updated = stored.clone();
        for comment in state.comments.values_mut().filter(|c| c.author_id == id) {
            comment.author_name = updated.name.clone();
        }
        Ok(Some(updated))
    }

    async fn delete_user(&self, id: i64) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.users.remove(&id);

        let owned: Vec<i64> = state
            .items
            .values()
            .filter(|item| item.owner_id == id)
            .map(|item| item.id)
            .collect();
        for item_id in owned {
            state.cascade_item(item_id);
        }
        state.bookings.retain(|_, b| b.booker_id != id);
        state.comments.retain(|_, c| c.author_id != id);

        let requests: Vec<i64> = state
            .requests
            .values()
            .filter(|r| r.requester_id == id)
            .map(|r| r.id)
            .collect();
        for request_id in requests {
            state.requests.remove(&request_id);
            for item in state.items.values_mut() {
                if item.request_id == Some(request_id) {
                    item.request_id = None;
                }
            }
        }
        Ok(())
    }

    async fn find_item(&self, id: i64) -> AppResult<Option<Item>> {
        Ok(self.state.read().await.items.get(&id).cloned())
    }

    async fn list_items_by_owner(&self, owner_id: i64, page: PageRequest) -> AppResult<Vec<Item>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .values()
            .filter(|item| item.owner_id == owner_id)
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .cloned()
            .collect())
    }

    async fn list_items_by_request(&self, request_id: i64) -> AppResult<Vec<Item>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .values()
            .filter(|item| item.request_id == Some(request_id))
            .cloned()
            .collect())
    }

    async fn search_items(&self, text: &str, page: PageRequest) -> AppResult<Vec<Item>> {
        let needle = text.to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .items
            .values()
            .filter(|item| {
                item.available
                    && (item.name.to_lowercase().contains(&needle)
                        || item.description.to_lowercase().contains(&needle))
            })
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .cloned()
            .collect())
    }

    async fn insert_item(&self, owner_id: i64, item: &CreateItem) -> AppResult<Item> {
        let mut state = self.state.write().await;
        state.last_item_id += 1;
        let created = Item {
            id: state.last_item_id,
            name: item.name.clone(),
            description: item.description.clone(),
            available: item.available.unwrap_or(false),
            owner_id,
            request_id: item.request_id,
        };
        state.items.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_item(&self, id: i64, item: &UpdateItem) -> AppResult<Option<Item>> {
        let mut state = self.state.write().await;
        Ok(state.items.get_mut(&id).map(|stored| {
            item.apply(stored);
            stored.clone()
        }))
    }

    async fn delete_item(&self, id: i64) -> AppResult<()> {
        self.state.write().await.cascade_item(id);
        Ok(())
    }

    async fn list_comments_by_item(&self, item_id: i64) -> AppResult<Vec<Comment>> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.item_id == item_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn insert_comment(&self, comment: &NewComment) -> AppResult<Comment> {
        let mut state = self.state.write().await;
        let author_name = state
            .users
            .get(&comment.author_id)
            .map(|user| user.name.clone())
            .ok_or_else(|| AppError::UserNotFound(format!("User {} not found", comment.author_id)))?;
        state.last_comment_id += 1;
        let created = Comment {
            id: state.last_comment_id,
            text: comment.text.clone(),
            item_id: comment.item_id,
            author_id: comment.author_id,
            author_name,
            created: comment.created,
        };
        state.comments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_request(&self, id: i64) -> AppResult<Option<ItemRequest>> {
        Ok(self.state.read().await.requests.get(&id).cloned())
    }

    async fn list_requests_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>> {
        let state = self.state.read().await;
        let mut requests: Vec<ItemRequest> = state
            .requests
            .values()
            .filter(|r| r.requester_id == requester_id)
            .cloned()
            .collect();
        requests.sort_by(newest_first);
        Ok(requests)
    }

    async fn list_requests_by_others(&self, user_id: i64, page: PageRequest) -> AppResult<Vec<ItemRequest>> {
        let state = self.state.read().await;
        let mut requests: Vec<ItemRequest> = state
            .requests
            .values()
            .filter(|r| r.requester_id != user_id)
            .cloned()
            .collect();
        requests.sort_by(newest_first);
        Ok(requests
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect())
    }

    async fn insert_request(&self, request: &NewItemRequest) -> AppResult<ItemRequest> {
        let mut state = self.state.write().await;
        state.last_request_id += 1;
        let created = ItemRequest {
            id: state.last_request_id,
            description: request.description.clone(),
            requester_id: request.requester_id,
            created: request.created,
        };
        state.requests.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_booking(&self, id: i64) -> AppResult<Option<Booking>> {
        Ok(self.state.read().await.bookings.get(&id).cloned())
    }

    async fn query_bookings(&self, query: &BookingQuery) -> AppResult<Vec<Booking>> {
        let state = self.state.read().await;
        let mut rows: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| state.in_scope(query.scope, b) && query.matches(b))
            .cloned()
            .collect();
        rows.sort_by(|a, b| query.sort.compare(a, b));

        if let Some(page) = query.page {
            rows = rows
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.size as usize)
                .collect();
        }
        Ok(rows)
    }

    async fn delete_booking(&self, id: i64) -> AppResult<()> {
        self.state.write().await.bookings.remove(&id);
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

fn newest_first(a: &ItemRequest, b: &ItemRequest) -> std::cmp::Ordering {
    b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id))
}

/// Exclusive access to the memory state with booking writes staged until commit
pub struct MemoryUnitOfWork {
    guard: OwnedRwLockWriteGuard<MemoryState>,
    staged: BTreeMap<i64, Booking>,
    last_booking_id: i64,
}

impl MemoryUnitOfWork {
    fn current(&self, id: i64) -> Option<Booking> {
        self.staged
            .get(&id)
            .or_else(|| self.guard.bookings.get(&id))
            .cloned()
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn find_user(&mut self, id: i64) -> AppResult<Option<User>> {
        Ok(self.guard.users.get(&id).cloned())
    }

    async fn find_item(&mut self, id: i64) -> AppResult<Option<Item>> {
        Ok(self.guard.items.get(&id).cloned())
    }

    async fn lock_booking(&mut self, id: i64) -> AppResult<Option<Booking>> {
        Ok(self.current(id))
    }

    async fn insert_booking(&mut self, booking: &NewBooking) -> AppResult<Booking> {
        self.last_booking_id += 1;
        let stored = Booking {
            id: self.last_booking_id,
            start: booking.start,
            end: booking.end,
            item_id: booking.item_id,
            booker_id: booking.booker_id,
            status: BookingStatus::Waiting,
        };
        self.staged.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_status(&mut self, id: i64, status: BookingStatus) -> AppResult<Booking> {
        let mut booking = self
            .current(id)
            .ok_or_else(|| AppError::BookingNotFound(format!("Booking {} not found", id)))?;
        booking.status = status;
        self.staged.insert(id, booking.clone());
        Ok(booking)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryUnitOfWork {
            mut guard,
            staged,
            last_booking_id,
        } = *self;
        guard.bookings.extend(staged);
        guard.last_booking_id = last_booking_id;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{BookingSort, TimeFilter};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap() + Duration::hours(h)
    }

    async fn seed(store: &MemoryStore) -> (User, User, Item) {
        let owner = store
            .insert_user(&CreateUser { name: "Owner".into(), email: "owner@example.com".into() })
            .await
            .unwrap();
        let booker = store
            .insert_user(&CreateUser { name: "Booker".into(), email: "booker@example.com".into() })
            .await
            .unwrap();
        let item = store
            .insert_item(
                owner.id,
                &CreateItem {
                    name: "Drill".into(),
                    description: "Cordless".into(),
                    available: Some(true),
                    request_id: None,
                },
            )
            .await
            .unwrap();
        (owner, booker, item)
    }

    fn new_booking(item: &Item, booker: &User, start: i64, end: i64) -> NewBooking {
        NewBooking { start: at(start), end: at(end), item_id: item.id, booker_id: booker.id }
    }

    #[tokio::test]
    async fn test_uncommitted_unit_of_work_is_discarded() {
        let store = MemoryStore::new();
        let (_, booker, item) = seed(&store).await;

        {
            let mut uow = store.begin().await.unwrap();
            uow.insert_booking(&new_booking(&item, &booker, 1, 2)).await.unwrap();
        }
        assert!(store.find_booking(1).await.unwrap().is_none());

        let mut uow = store.begin().await.unwrap();
        let created = uow.insert_booking(&new_booking(&item, &booker, 1, 2)).await.unwrap();
        uow.commit().await.unwrap();

        // Ids handed out by the dropped unit of work are reused
        assert_eq!(created.id, 1);
        assert_eq!(store.find_booking(1).await.unwrap().unwrap().status, BookingStatus::Waiting);
    }

    #[tokio::test]
    async fn test_update_status_staged_until_commit() {
        let store = MemoryStore::new();
        let (_, booker, item) = seed(&store).await;
        let stored = store
            .insert_raw_booking(&new_booking(&item, &booker, 1, 2), BookingStatus::Waiting)
            .await;

        let mut uow = store.begin().await.unwrap();
        let updated = uow.update_status(stored.id, BookingStatus::Approved).await.unwrap();
        assert_eq!(updated.status, BookingStatus::Approved);
        assert_eq!(
            uow.lock_booking(stored.id).await.unwrap().unwrap().status,
            BookingStatus::Approved
        );
        uow.commit().await.unwrap();

        assert_eq!(
            store.find_booking(stored.id).await.unwrap().unwrap().status,
            BookingStatus::Approved
        );
    }

    #[tokio::test]
    async fn test_query_owner_scope_sort_and_page() {
        let store = MemoryStore::new();
        let (owner, booker, item) = seed(&store).await;
        for start in [3, 1, 2, 5, 4] {
            store
                .insert_raw_booking(&new_booking(&item, &booker, start, start + 1), BookingStatus::Waiting)
                .await;
        }

        let query = BookingQuery::new(BookingScope::Owner(owner.id), BookingSort::START_DESC)
            .with_page(PageRequest::from_offset(3, 2).unwrap());
        let starts: Vec<_> = store
            .query_bookings(&query)
            .await
            .unwrap()
            .iter()
            .map(|b| b.start)
            .collect();
        // from = 3, size = 2 -> page 1 -> rows 2..4 of [5, 4, 3, 2, 1]
        assert_eq!(starts, vec![at(3), at(2)]);

        let none = BookingQuery::new(BookingScope::Owner(booker.id), BookingSort::START_DESC);
        assert!(store.query_bookings(&none).await.unwrap().is_empty());

        let past = BookingQuery::new(BookingScope::Booker(booker.id), BookingSort::START_ASC)
            .with_time(TimeFilter::EndsBefore(at(4)));
        let starts: Vec<_> = store.query_bookings(&past).await.unwrap().iter().map(|b| b.start).collect();
        assert_eq!(starts, vec![at(1), at(2)]);
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = MemoryStore::new();
        assert!(store.delete_booking(42).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let store = MemoryStore::new();
        let (owner, booker, item) = seed(&store).await;
        store
            .insert_raw_booking(&new_booking(&item, &booker, 1, 2), BookingStatus::Approved)
            .await;
        store
            .insert_comment(&NewComment {
                text: "Great".into(),
                item_id: item.id,
                author_id: booker.id,
                created: at(3),
            })
            .await
            .unwrap();

        store.delete_user(owner.id).await.unwrap();

        assert!(store.find_item(item.id).await.unwrap().is_none());
        assert!(store.find_booking(1).await.unwrap().is_none());
        assert!(store.list_comments_by_item(item.id).await.unwrap().is_empty());
        assert!(store.find_user(booker.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_search_only_available_ignoring_case() {
        let store = MemoryStore::new();
        let (_, _, drill) = seed(&store).await;
        let page = PageRequest::from_offset(0, 10).unwrap();

        let found = store.search_items("cORDless", page).await.unwrap();
        assert_eq!(found.iter().map(|i| i.id).collect::<Vec<_>>(), vec![drill.id]);

        let hidden = UpdateItem { available: Some(false), ..Default::default() };
        store.update_item(drill.id, &hidden).await.unwrap();
        assert!(store.search_items("drill", page).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_requests_newest_first() {
        let store = MemoryStore::new();
        let (owner, booker, _) = seed(&store).await;
        for (h, who) in [(1, owner.id), (3, booker.id), (2, booker.id)] {
            store
                .insert_request(&NewItemRequest {
                    description: format!("need {}", h),
                    requester_id: who,
                    created: at(h),
                })
                .await
                .unwrap();
        }

        let mine = store.list_requests_by_requester(booker.id).await.unwrap();
        assert_eq!(mine.iter().map(|r| r.created).collect::<Vec<_>>(), vec![at(3), at(2)]);

        let page = PageRequest::from_offset(0, 10).unwrap();
        let others = store.list_requests_by_others(booker.id, page).await.unwrap();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].requester_id, owner.id);
    }
}
