//! Business logic services

pub mod bookings;
pub mod comments;
pub mod items;
pub mod requests;
pub mod users;

use std::sync::Arc;

use crate::{clock::Clock, error::AppResult, repository::Store};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    store: Arc<dyn Store>,
    pub users: users::UsersService,
    pub items: items::ItemsService,
    pub bookings: bookings::BookingsService,
    pub comments: comments::CommentsService,
    pub requests: requests::RequestsService,
}

impl Services {
    /// Create all services over the given store and time source
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        let bookings = bookings::BookingsService::new(store.clone(), clock.clone());
        Self {
            users: users::UsersService::new(store.clone()),
            items: items::ItemsService::new(store.clone(), bookings.clone()),
            comments: comments::CommentsService::new(store.clone(), clock.clone(), bookings.clone()),
            requests: requests::RequestsService::new(store.clone(), clock),
            bookings,
            store,
        }
    }

    /// Check that the backing store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
