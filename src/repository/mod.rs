//! Repository layer for storage operations
//!
//! Services talk to storage through [`Store`]. Mutating booking operations
//! run inside a [`UnitOfWork`]: every read and the final write happen in one
//! transaction, and dropping the unit of work without committing discards it.

pub mod bookings;
pub mod comments;
pub mod items;
pub mod memory;
pub mod query;
pub mod requests;
pub mod users;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::AppResult,
    models::{
        item::{CreateItem, UpdateItem},
        user::{CreateUser, UpdateUser},
        Booking, BookingStatus, Comment, Item, ItemRequest, NewBooking, NewComment, NewItemRequest, User,
    },
};

pub use memory::MemoryStore;
pub use query::{BookingQuery, BookingScope, BookingSort, PageRequest, SortDirection, SortField, TimeFilter};

/// Storage used by the services
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a unit of work for a read-then-write booking operation
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;

    async fn find_user(&self, id: i64) -> AppResult<Option<User>>;
    async fn list_users(&self) -> AppResult<Vec<User>>;
    async fn insert_user(&self, user: &CreateUser) -> AppResult<User>;
    /// Update a user; `None` when it does not exist
    async fn update_user(&self, id: i64, user: &UpdateUser) -> AppResult<Option<User>>;
    /// Delete a user with their items, bookings, comments and requests
    async fn delete_user(&self, id: i64) -> AppResult<()>;

    async fn find_item(&self, id: i64) -> AppResult<Option<Item>>;
    async fn list_items_by_owner(&self, owner_id: i64, page: PageRequest) -> AppResult<Vec<Item>>;
    async fn list_items_by_request(&self, request_id: i64) -> AppResult<Vec<Item>>;
    /// Available items whose name or description contains `text`, ignoring case
    async fn search_items(&self, text: &str, page: PageRequest) -> AppResult<Vec<Item>>;
    async fn insert_item(&self, owner_id: i64, item: &CreateItem) -> AppResult<Item>;
    /// Update an item; `None` when it does not exist
    async fn update_item(&self, id: i64, item: &UpdateItem) -> AppResult<Option<Item>>;
    /// Delete an item with its bookings and comments
    async fn delete_item(&self, id: i64) -> AppResult<()>;

    async fn list_comments_by_item(&self, item_id: i64) -> AppResult<Vec<Comment>>;
    async fn insert_comment(&self, comment: &NewComment) -> AppResult<Comment>;

    async fn find_request(&self, id: i64) -> AppResult<Option<ItemRequest>>;
    async fn list_requests_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>>;
    async fn list_requests_by_others(&self, user_id: i64, page: PageRequest) -> AppResult<Vec<ItemRequest>>;
    async fn insert_request(&self, request: &NewItemRequest) -> AppResult<ItemRequest>;

    async fn find_booking(&self, id: i64) -> AppResult<Option<Booking>>;
    async fn query_bookings(&self, query: &BookingQuery) -> AppResult<Vec<Booking>>;
    /// Delete a booking; a missing id is not an error
    async fn delete_booking(&self, id: i64) -> AppResult<()>;

    /// Check that the store is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// One transactional read-then-write sequence against the store
#[async_trait]
pub trait UnitOfWork: Send {
    async fn find_user(&mut self, id: i64) -> AppResult<Option<User>>;
    async fn find_item(&mut self, id: i64) -> AppResult<Option<Item>>;
    /// Read a booking and keep it locked until the unit of work ends
    async fn lock_booking(&mut self, id: i64) -> AppResult<Option<Booking>>;
    /// Store a new `WAITING` booking and return it with its assigned id
    async fn insert_booking(&mut self, booking: &NewBooking) -> AppResult<Booking>;
    async fn update_status(&mut self, id: i64, status: BookingStatus) -> AppResult<Booking>;
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// PostgreSQL-backed store holding the connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub items: items::ItemsRepository,
    pub bookings: bookings::BookingsRepository,
    pub comments: comments::CommentsRepository,
    pub requests: requests::RequestsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            items: items::ItemsRepository::new(pool.clone()),
            bookings: bookings::BookingsRepository::new(pool.clone()),
            comments: comments::CommentsRepository::new(pool.clone()),
            requests: requests::RequestsRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl Store for Repository {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        // READ COMMITTED: a transaction blocked on `FOR UPDATE` resumes with the
        // row as committed by the other one and sees its decision.
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.list().await
    }

    async fn insert_user(&self, user: &CreateUser) -> AppResult<User> {
        self.users.create(user).await
    }

    async fn update_user(&self, id: i64, user: &UpdateUser) -> AppResult<Option<User>> {
        self.users.update(id, user).await
    }

    async fn delete_user(&self, id: i64) -> AppResult<()> {
        self.users.delete(id).await
    }

    async fn find_item(&self, id: i64) -> AppResult<Option<Item>> {
        self.items.find_by_id(id).await
    }

    async fn list_items_by_owner(&self, owner_id: i64, page: PageRequest) -> AppResult<Vec<Item>> {
        self.items.list_by_owner(owner_id, page).await
    }

    async fn list_items_by_request(&self, request_id: i64) -> AppResult<Vec<Item>> {
        self.items.list_by_request(request_id).await
    }

    async fn search_items(&self, text: &str, page: PageRequest) -> AppResult<Vec<Item>> {
        self.items.search(text, page).await
    }

    async fn insert_item(&self, owner_id: i64, item: &CreateItem) -> AppResult<Item> {
        self.items.create(owner_id, item).await
    }

    async fn update_item(&self, id: i64, item: &UpdateItem) -> AppResult<Option<Item>> {
        self.items.update(id, item).await
    }

    async fn delete_item(&self, id: i64) -> AppResult<()> {
        self.items.delete(id).await
    }

    async fn list_comments_by_item(&self, item_id: i64) -> AppResult<Vec<Comment>> {
        self.comments.list_by_item(item_id).await
    }

    async fn insert_comment(&self, comment: &NewComment) -> AppResult<Comment> {
        self.comments.create(comment).await
    }

    async fn find_request(&self, id: i64) -> AppResult<Option<ItemRequest>> {
        self.requests.find_by_id(id).await
    }

    async fn list_requests_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>> {
        self.requests.list_by_requester(requester_id).await
    }

    async fn list_requests_by_others(&self, user_id: i64, page: PageRequest) -> AppResult<Vec<ItemRequest>> {
        self.requests.list_by_others(user_id, page).await
    }

    async fn insert_request(&self, request: &NewItemRequest) -> AppResult<ItemRequest> {
        self.requests.create(request).await
    }

    async fn find_booking(&self, id: i64) -> AppResult<Option<Booking>> {
        self.bookings.find_by_id(id).await
    }

    async fn query_bookings(&self, query: &BookingQuery) -> AppResult<Vec<Booking>> {
        self.bookings.query(query).await
    }

    async fn delete_booking(&self, id: i64) -> AppResult<()> {
        self.bookings.delete(id).await
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// PostgreSQL transaction; rolled back on drop unless committed
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn find_user(&mut self, id: i64) -> AppResult<Option<User>> {
        users::find_by_id(&mut *self.tx, id).await
    }

    async fn find_item(&mut self, id: i64) -> AppResult<Option<Item>> {
        items::find_by_id(&mut *self.tx, id).await
    }

    async fn lock_booking(&mut self, id: i64) -> AppResult<Option<Booking>> {
        bookings::find_for_update(&mut *self.tx, id).await
    }

    async fn insert_booking(&mut self, booking: &NewBooking) -> AppResult<Booking> {
        bookings::insert(&mut *self.tx, booking).await
    }

    async fn update_status(&mut self, id: i64, status: BookingStatus) -> AppResult<Booking> {
        bookings::update_status(&mut *self.tx, id, status).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
