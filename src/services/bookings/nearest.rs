use crate::{
    error::{AppError, AppResult},
    models::{Booking, BookingStatus},
    repository::{BookingQuery, BookingScope, BookingSort, PageRequest, TimeFilter},
};

use super::BookingsService;

impl BookingsService {
    /// Most recent approved booking that has already started: latest end wins
    pub async fn last(&self, item_id: i64) -> AppResult<Option<Booking>> {
        self.ensure_item(item_id).await?;
        let query = BookingQuery::new(BookingScope::Item(item_id), BookingSort::END_DESC)
            .with_status(BookingStatus::Approved)
            .with_time(TimeFilter::StartsBefore(self.clock.now()))
            .with_page(PageRequest::first());
        Ok(self.store.query_bookings(&query).await?.into_iter().next())
    }

    /// Approved booking starting soonest in the future
    pub async fn next(&self, item_id: i64) -> AppResult<Option<Booking>> {
        self.ensure_item(item_id).await?;
        let query = BookingQuery::new(BookingScope::Item(item_id), BookingSort::START_ASC)
            .with_status(BookingStatus::Approved)
            .with_time(TimeFilter::StartsAfter(self.clock.now()))
            .with_page(PageRequest::first());
        Ok(self.store.query_bookings(&query).await?.into_iter().next())
    }

    async fn ensure_item(&self, item_id: i64) -> AppResult<()> {
        self.store
            .find_item(item_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::ItemNotFound(format!("Item {} not found", item_id)))
    }
}
