//! Bookings repository for database operations

use sqlx::{postgres::PgExecutor, Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{Booking, BookingStatus, NewBooking},
};

use super::{BookingQuery, BookingScope, SortDirection, SortField, TimeFilter};

const BOOKING_COLUMNS: &str = "b.id, b.start_date, b.end_date, b.item_id, b.booker_id, b.status";

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get booking by ID
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings b WHERE b.id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    /// Run a filtered, sorted and paged booking query
    pub async fn query(&self, query: &BookingQuery) -> AppResult<Vec<Booking>> {
        let mut builder = build_query(query);
        let bookings = builder
            .build_query_as::<Booking>()
            .fetch_all(&self.pool)
            .await?;
        Ok(bookings)
    }

    /// Delete a booking (no-op when it does not exist)
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            tracing::debug!("Booking {} was already absent", id);
        }
        Ok(())
    }
}

/// Read a booking and lock its row until the surrounding transaction ends
pub async fn find_for_update<'e, E>(executor: E, id: i64) -> AppResult<Option<Booking>>
where
    E: PgExecutor<'e>,
{
    let booking = sqlx::query_as::<_, Booking>(&format!(
        "SELECT {} FROM bookings b WHERE b.id = $1 FOR UPDATE",
        BOOKING_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(booking)
}

/// Insert a new booking in `WAITING` status
pub async fn insert<'e, E>(executor: E, booking: &NewBooking) -> AppResult<Booking>
where
    E: PgExecutor<'e>,
{
    let created = sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (start_date, end_date, item_id, booker_id, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, start_date, end_date, item_id, booker_id, status
        "#,
    )
    .bind(booking.start)
    .bind(booking.end)
    .bind(booking.item_id)
    .bind(booking.booker_id)
    .bind(BookingStatus::Waiting)
    .fetch_one(executor)
    .await?;
    Ok(created)
}

/// Set the status of an existing booking
pub async fn update_status<'e, E>(executor: E, id: i64, status: BookingStatus) -> AppResult<Booking>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings SET status = $1 WHERE id = $2
        RETURNING id, start_date, end_date, item_id, booker_id, status
        "#,
    )
    .bind(status)
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::BookingNotFound(format!("Booking {} not found", id)))
}

fn build_query(query: &BookingQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM bookings b", BOOKING_COLUMNS));

    match query.scope {
        BookingScope::Booker(user_id) => {
            builder.push(" WHERE b.booker_id = ").push_bind(user_id);
        }
        BookingScope::Owner(user_id) => {
            builder
                .push(" JOIN items i ON i.id = b.item_id WHERE i.owner_id = ")
                .push_bind(user_id);
        }
        BookingScope::Item(item_id) => {
            builder.push(" WHERE b.item_id = ").push_bind(item_id);
        }
        BookingScope::BookerOnItem { booker_id, item_id } => {
            builder
                .push(" WHERE b.booker_id = ")
                .push_bind(booker_id)
                .push(" AND b.item_id = ")
                .push_bind(item_id);
        }
    }

    if let Some(status) = query.status {
        builder.push(" AND b.status = ").push_bind(status);
    }

    match query.time {
        Some(TimeFilter::StartsAfter(t)) => {
            builder.push(" AND b.start_date > ").push_bind(t);
        }
        Some(TimeFilter::StartsBefore(t)) => {
            builder.push(" AND b.start_date < ").push_bind(t);
        }
        Some(TimeFilter::EndsBefore(t)) => {
            builder.push(" AND b.end_date < ").push_bind(t);
        }
        Some(TimeFilter::Covers(t)) => {
            builder
                .push(" AND b.start_date <= ")
                .push_bind(t)
                .push(" AND b.end_date >= ")
                .push_bind(t);
        }
        None => {}
    }

    let column = match query.sort.field {
        SortField::Start => "b.start_date",
        SortField::End => "b.end_date",
    };
    let direction = match query.sort.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    builder.push(format!(" ORDER BY {} {}, b.id ASC", column, direction));

    if let Some(page) = query.page {
        builder
            .push(" LIMIT ")
            .push_bind(page.size)
            .push(" OFFSET ")
            .push_bind(page.offset());
    }

    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{BookingSort, PageRequest};
    use chrono::Utc;

    #[test]
    fn test_owner_current_sql() {
        let query = BookingQuery::new(BookingScope::Owner(7), BookingSort::START_ASC)
            .with_time(TimeFilter::Covers(Utc::now()))
            .with_page(PageRequest::from_offset(15, 10).unwrap());
        let builder = build_query(&query);
        assert_eq!(
            builder.sql(),
            "SELECT b.id, b.start_date, b.end_date, b.item_id, b.booker_id, b.status FROM bookings b \
             JOIN items i ON i.id = b.item_id WHERE i.owner_id = $1 \
             AND b.start_date <= $2 AND b.end_date >= $3 \
             ORDER BY b.start_date ASC, b.id ASC LIMIT $4 OFFSET $5"
        );
    }

    #[test]
    fn test_item_last_sql() {
        let query = BookingQuery::new(BookingScope::Item(3), BookingSort::END_DESC)
            .with_status(BookingStatus::Approved)
            .with_time(TimeFilter::StartsBefore(Utc::now()))
            .with_page(PageRequest::first());
        let builder = build_query(&query);
        assert_eq!(
            builder.sql(),
            "SELECT b.id, b.start_date, b.end_date, b.item_id, b.booker_id, b.status FROM bookings b \
             WHERE b.item_id = $1 AND b.status = $2 AND b.start_date < $3 \
             ORDER BY b.end_date DESC, b.id ASC LIMIT $4 OFFSET $5"
        );
    }

    #[test]
    fn test_finished_booking_sql() {
        let query = BookingQuery::new(
            BookingScope::BookerOnItem { booker_id: 2, item_id: 3 },
            BookingSort::END_DESC,
        )
        .with_status(BookingStatus::Approved)
        .with_time(TimeFilter::EndsBefore(Utc::now()))
        .with_page(PageRequest::first());
        let builder = build_query(&query);
        assert_eq!(
            builder.sql(),
            "SELECT b.id, b.start_date, b.end_date, b.item_id, b.booker_id, b.status FROM bookings b \
             WHERE b.booker_id = $1 AND b.item_id = $2 AND b.status = $3 AND b.end_date < $4 \
             ORDER BY b.end_date DESC, b.id ASC LIMIT $5 OFFSET $6"
        );
    }
}
