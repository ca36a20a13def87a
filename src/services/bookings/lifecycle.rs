use crate::{
    error::{AppError, AppResult},
    models::{Booking, BookingDetails, BookingStatus, BookingWindow, ItemShort, NewBooking, UserShort},
};

use super::BookingsService;

impl BookingsService {
    /// Request a booking of `item_id` by `user_id`.
    ///
    /// Checks run in a fixed order, so a request that is wrong in several
    /// ways always reports the first failing check.
    pub async fn create(
        &self,
        user_id: i64,
        item_id: i64,
        window: BookingWindow,
    ) -> AppResult<BookingDetails> {
        let mut uow = self.store.begin().await?;

        let booker = uow
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User {} not found", user_id)))?;
        let item = uow
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::ItemNotFound(format!("Item {} not found", item_id)))?;

        let now = self.clock.now();
        let start = window
            .start
            .ok_or_else(|| AppError::Validation("missing start".to_string()))?;
        if start < now {
            return Err(AppError::Validation("invalid start".to_string()));
        }
        let end = window
            .end
            .ok_or_else(|| AppError::Validation("missing end".to_string()))?;
        if end <= start {
            return Err(AppError::Validation("invalid end".to_string()));
        }
        if !item.available {
            return Err(AppError::Validation("not available".to_string()));
        }
        if booker.id == item.owner_id {
            tracing::debug!("User {} tried to book own item {}", booker.id, item.id);
            return Err(AppError::BookingNotFound(format!("Item {} cannot be booked", item.id)));
        }

        let booking = uow
            .insert_booking(&NewBooking {
                start,
                end,
                item_id: item.id,
                booker_id: booker.id,
            })
            .await?;
        uow.commit().await?;

        tracing::info!(
            booking_id = booking.id,
            item_id = item.id,
            booker_id = booker.id,
            "Booking requested"
        );

        Ok(BookingDetails::new(
            &booking,
            UserShort::from(&booker),
            ItemShort::from(&item),
        ))
    }

    /// Approve or reject a waiting booking on behalf of the item owner
    pub async fn update(
        &self,
        booking_id: i64,
        approved: bool,
        user_id: i64,
    ) -> AppResult<BookingDetails> {
        let mut uow = self.store.begin().await?;

        let booking = uow
            .lock_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(format!("Booking {} not found", booking_id)))?;
        let booker = uow.find_user(booking.booker_id).await?.ok_or_else(|| {
            AppError::UserNotFound(format!("User {} not found", booking.booker_id))
        })?;
        let item = uow.find_item(booking.item_id).await?.ok_or_else(|| {
            AppError::ItemNotFound(format!("Item {} not found", booking.item_id))
        })?;

        if item.owner_id != user_id {
            tracing::debug!("User {} is not the owner of item {}", user_id, item.id);
            return Err(AppError::BookingNotFound(format!("Booking {} not found", booking_id)));
        }
        if booking.status != BookingStatus::Waiting {
            return Err(AppError::Validation(format!(
                "Booking {} is already {}",
                booking_id, booking.status
            )));
        }

        let status = BookingStatus::from_decision(approved);
        let updated = uow.update_status(booking.id, status).await?;
        uow.commit().await?;

        tracing::info!(booking_id = updated.id, status = %updated.status, "Booking decided");

        Ok(BookingDetails::new(
            &updated,
            UserShort::from(&booker),
            ItemShort::from(&item),
        ))
    }

    /// Get a booking visible to its booker or to the item owner
    pub async fn get_by_id(&self, user_id: i64, booking_id: i64) -> AppResult<BookingDetails> {
        let booking = self.find_visible(user_id, booking_id).await?;
        let mut details = self.describe(vec![booking]).await?;
        details
            .pop()
            .ok_or_else(|| AppError::Internal("booking lost while describing".to_string()))
    }

    async fn find_visible(&self, user_id: i64, booking_id: i64) -> AppResult<Booking> {
        let not_found = || AppError::BookingNotFound(format!("Booking {} not found", booking_id));

        let booking = self.store.find_booking(booking_id).await?.ok_or_else(not_found)?;
        if booking.booker_id == user_id {
            return Ok(booking);
        }
        match self.store.find_item(booking.item_id).await? {
            Some(item) if item.owner_id == user_id => Ok(booking),
            _ => Err(not_found()),
        }
    }

    /// Delete a booking regardless of its status or who asks
    pub async fn delete_by_id(&self, booking_id: i64) -> AppResult<()> {
        self.store.delete_booking(booking_id).await?;
        tracing::info!(booking_id, "Booking deleted");
        Ok(())
    }
}
