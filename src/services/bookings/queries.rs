use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{BookingDetails, BookingState, BookingStatus},
    repository::{BookingQuery, BookingScope, BookingSort, PageRequest, TimeFilter},
};

use super::BookingsService;

/// Side of the booking a listing is made for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Booker,
    Owner,
}

/// Query for one listing bucket.
///
/// Owners see their current bookings by ascending start; every other
/// combination lists by descending start.
fn plan(role: Role, user_id: i64, state: BookingState, now: DateTime<Utc>) -> BookingQuery {
    let scope = match role {
        Role::Booker => BookingScope::Booker(user_id),
        Role::Owner => BookingScope::Owner(user_id),
    };

    match state {
        BookingState::All => BookingQuery::new(scope, BookingSort::START_DESC),
        BookingState::Future => BookingQuery::new(scope, BookingSort::START_DESC)
            .with_time(TimeFilter::StartsAfter(now)),
        BookingState::Past => BookingQuery::new(scope, BookingSort::START_DESC)
            .with_time(TimeFilter::EndsBefore(now)),
        BookingState::Current => {
            let sort = match role {
                Role::Booker => BookingSort::START_DESC,
                Role::Owner => BookingSort::START_ASC,
            };
            BookingQuery::new(scope, sort).with_time(TimeFilter::Covers(now))
        }
        BookingState::Waiting => BookingQuery::new(scope, BookingSort::START_DESC)
            .with_status(BookingStatus::Waiting),
        BookingState::Rejected => BookingQuery::new(scope, BookingSort::START_DESC)
            .with_status(BookingStatus::Rejected),
    }
}

impl BookingsService {
    /// Bookings made by a user
    pub async fn list_for_booker(
        &self,
        user_id: i64,
        state: BookingState,
        from: i64,
        size: i64,
    ) -> AppResult<Vec<BookingDetails>> {
        self.list(Role::Booker, user_id, state, from, size).await
    }

    /// Bookings on items owned by a user
    pub async fn list_for_owner(
        &self,
        user_id: i64,
        state: BookingState,
        from: i64,
        size: i64,
    ) -> AppResult<Vec<BookingDetails>> {
        self.list(Role::Owner, user_id, state, from, size).await
    }

    async fn list(
        &self,
        role: Role,
        user_id: i64,
        state: BookingState,
        from: i64,
        size: i64,
    ) -> AppResult<Vec<BookingDetails>> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User {} not found", user_id)))?;
        let page = PageRequest::from_offset(from, size)?;

        let query = plan(role, user_id, state, self.clock.now()).with_page(page);
        let bookings = self.store.query_bookings(&query).await?;
        tracing::debug!(
            user_id,
            ?role,
            ?state,
            page = page.index,
            found = bookings.len(),
            "Listed bookings"
        );

        self.describe(bookings).await
    }

    /// Whether `booker_id` has an approved booking of `item_id` that is over
    pub async fn has_finished_booking(&self, booker_id: i64, item_id: i64) -> AppResult<bool> {
        let query = BookingQuery::new(
            BookingScope::BookerOnItem { booker_id, item_id },
            BookingSort::END_DESC,
        )
        .with_status(BookingStatus::Approved)
        .with_time(TimeFilter::EndsBefore(self.clock.now()))
        .with_page(PageRequest::first());
        Ok(!self.store.query_bookings(&query).await?.is_empty())
    }
}
