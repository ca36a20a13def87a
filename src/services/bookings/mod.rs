//! Booking service: lifecycle, listings and nearest-booking lookups

mod lifecycle;
mod nearest;
mod queries;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{Booking, BookingDetails, ItemShort, UserShort},
    repository::Store,
};

#[derive(Clone)]
pub struct BookingsService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl BookingsService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Attach booker and item summaries to bookings for display
    pub async fn describe(&self, bookings: Vec<Booking>) -> AppResult<Vec<BookingDetails>> {
        let mut users: BTreeMap<i64, UserShort> = BTreeMap::new();
        let mut items: BTreeMap<i64, ItemShort> = BTreeMap::new();

        let mut details = Vec::with_capacity(bookings.len());
        for booking in bookings {
            if !users.contains_key(&booking.booker_id) {
                let user = self
                    .store
                    .find_user(booking.booker_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::UserNotFound(format!("User {} not found", booking.booker_id))
                    })?;
                users.insert(user.id, UserShort::from(&user));
            }
            if !items.contains_key(&booking.item_id) {
                let item = self
                    .store
                    .find_item(booking.item_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::ItemNotFound(format!("Item {} not found", booking.item_id))
                    })?;
                items.insert(item.id, ItemShort::from(&item));
            }

            details.push(BookingDetails::new(
                &booking,
                users[&booking.booker_id].clone(),
                items[&booking.item_id].clone(),
            ));
        }

        Ok(details)
    }
}
