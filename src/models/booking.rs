//! Booking model and related types

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

use super::item::ItemShort;
use super::user::UserShort;
use crate::error::AppError;

/// Booking status as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
        }
    }

    /// Status an owner's decision moves a waiting booking to
    pub fn from_decision(approved: bool) -> Self {
        if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(BookingStatus::Waiting),
            "APPROVED" => Ok(BookingStatus::Approved),
            "REJECTED" => Ok(BookingStatus::Rejected),
            other => Err(format!("Unknown booking status: {}", other)),
        }
    }
}

// SQLx conversion for BookingStatus (stored as TEXT)
impl sqlx::Type<Postgres> for BookingStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BookingStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookingStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Listing filter requested by a caller.
///
/// `Current`, `Past` and `Future` are evaluated against the time of the query;
/// `Waiting` and `Rejected` match the stored status directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

impl std::str::FromStr for BookingState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(BookingState::All),
            "CURRENT" => Ok(BookingState::Current),
            "PAST" => Ok(BookingState::Past),
            "FUTURE" => Ok(BookingState::Future),
            "WAITING" => Ok(BookingState::Waiting),
            "REJECTED" => Ok(BookingState::Rejected),
            other => Err(AppError::Validation(format!("Unknown state: {}", other))),
        }
    }
}

/// Booking row from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Booking {
    pub id: i64,
    #[sqlx(rename = "start_date")]
    pub start: DateTime<Utc>,
    #[sqlx(rename = "end_date")]
    pub end: DateTime<Utc>,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: BookingStatus,
}

/// Validated booking about to be stored; always starts out `WAITING`
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item_id: i64,
    pub booker_id: i64,
}

/// Time window proposed by a booker; either bound may be missing
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Booking with its item and booker, as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    pub id: i64,
    #[schema(value_type = String, example = "2030-01-01T10:00:00")]
    pub start: NaiveDateTime,
    #[schema(value_type = String, example = "2030-01-01T11:00:00")]
    pub end: NaiveDateTime,
    pub status: BookingStatus,
    pub booker_id: i64,
    pub booker: UserShort,
    pub item: ItemShort,
}

impl BookingDetails {
    pub fn new(booking: &Booking, booker: UserShort, item: ItemShort) -> Self {
        Self {
            id: booking.id,
            start: booking.start.naive_utc(),
            end: booking.end.naive_utc(),
            status: booking.status,
            booker_id: booking.booker_id,
            booker,
            item,
        }
    }
}

/// Compact booking embedded in item views (last / next booking)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingShort {
    pub id: i64,
    pub booker_id: i64,
    #[schema(value_type = String)]
    pub start: NaiveDateTime,
    #[schema(value_type = String)]
    pub end: NaiveDateTime,
    pub status: BookingStatus,
}

impl From<Booking> for BookingShort {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            booker_id: b.booker_id,
            start: b.start.naive_utc(),
            end: b.end.naive_utc(),
            status: b.status,
        }
    }
}
