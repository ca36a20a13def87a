//! Booking endpoints

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDateTime;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{BookingDetails, BookingState, BookingWindow},
    AppState,
};

use super::{AppJson, AppPath, AppQuery, SharerUserId};

/// Create booking request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Item to book
    pub item_id: i64,
    /// Start of the booking, UTC
    #[schema(value_type = Option<String>, example = "2030-01-01T10:00:00")]
    pub start: Option<NaiveDateTime>,
    /// End of the booking, UTC
    #[schema(value_type = Option<String>, example = "2030-01-01T11:00:00")]
    pub end: Option<NaiveDateTime>,
}

/// Owner decision on a booking
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApprovalQuery {
    /// `true` to approve, `false` to reject
    pub approved: bool,
}

/// Booking listing parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListBookingsQuery {
    /// ALL, CURRENT, PAST, FUTURE, WAITING or REJECTED (default: ALL)
    pub state: Option<String>,
    /// Index of the first wanted row (default: 0)
    pub from: Option<i64>,
    /// Rows per page (default from configuration)
    pub size: Option<i64>,
}

impl ListBookingsQuery {
    fn decode(&self, default_size: i64) -> AppResult<(BookingState, i64, i64)> {
        let state = self.state.as_deref().unwrap_or("ALL").parse::<BookingState>()?;
        Ok((state, self.from.unwrap_or(0), self.size.unwrap_or(default_size)))
    }
}

/// Request a booking
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    params(("X-Sharer-User-Id" = i64, Header, description = "Acting user")),
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking created in WAITING status", body = BookingDetails),
        (status = 400, description = "Invalid booking window or item not available"),
        (status = 404, description = "User or item not found, or item owned by the requester")
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    AppJson(request): AppJson<CreateBookingRequest>,
) -> AppResult<Json<BookingDetails>> {
    let window = BookingWindow {
        start: request.start.map(|t| t.and_utc()),
        end: request.end.map(|t| t.and_utc()),
    };
    let booking = state
        .services
        .bookings
        .create(user_id, request.item_id, window)
        .await?;
    Ok(Json(booking))
}

/// Approve or reject a booking
#[utoipa::path(
    patch,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Item owner"),
        ("id" = i64, Path, description = "Booking ID"),
        ApprovalQuery
    ),
    responses(
        (status = 200, description = "Booking decided", body = BookingDetails),
        (status = 400, description = "Booking already decided"),
        (status = 404, description = "Booking not found or requester is not the owner")
    )
)]
pub async fn update_booking(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    AppPath(id): AppPath<i64>,
    AppQuery(query): AppQuery<ApprovalQuery>,
) -> AppResult<Json<BookingDetails>> {
    let booking = state
        .services
        .bookings
        .update(id, query.approved, user_id)
        .await?;
    Ok(Json(booking))
}

/// Get a booking by ID
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Booker or item owner"),
        ("id" = i64, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking details", body = BookingDetails),
        (status = 404, description = "Booking not found or not visible to the requester")
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<BookingDetails>> {
    let booking = state.services.bookings.get_by_id(user_id, id).await?;
    Ok(Json(booking))
}

/// List bookings made by the requester
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Booker"),
        ListBookingsQuery
    ),
    responses(
        (status = 200, description = "Bookings, newest start first", body = Vec<BookingDetails>),
        (status = 400, description = "Unknown state or invalid paging"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    AppQuery(query): AppQuery<ListBookingsQuery>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    let (filter, from, size) = query.decode(state.config.pagination.default_size)?;
    let bookings = state
        .services
        .bookings
        .list_for_booker(user_id, filter, from, size)
        .await?;
    Ok(Json(bookings))
}

/// List bookings on items owned by the requester
#[utoipa::path(
    get,
    path = "/bookings/owner",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Item owner"),
        ListBookingsQuery
    ),
    responses(
        (status = 200, description = "Bookings; CURRENT is oldest start first, others newest first", body = Vec<BookingDetails>),
        (status = 400, description = "Unknown state or invalid paging"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_owner_bookings(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    AppQuery(query): AppQuery<ListBookingsQuery>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    let (filter, from, size) = query.decode(state.config.pagination.default_size)?;
    let bookings = state
        .services
        .bookings
        .list_for_owner(user_id, filter, from, size)
        .await?;
    Ok(Json(bookings))
}

/// Delete a booking
#[utoipa::path(
    delete,
    path = "/bookings/{id}",
    tag = "bookings",
    params(("id" = i64, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking deleted (or already absent)")
    )
)]
pub async fn delete_booking(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    state.services.bookings.delete_by_id(id).await?;
    Ok(StatusCode::OK)
}
