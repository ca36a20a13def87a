//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{bookings, comments, health, items, requests, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ShareHub API",
        version = "1.0.0",
        description = "Peer-to-peer item sharing and booking REST API"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Items
        items::list_items,
        items::search_items,
        items::get_item,
        items::create_item,
        items::update_item,
        items::delete_item,
        comments::create_comment,
        // Item requests
        requests::create_request,
        requests::list_own_requests,
        requests::list_all_requests,
        requests::get_request,
        // Bookings
        bookings::create_booking,
        bookings::update_booking,
        bookings::get_booking,
        bookings::list_bookings,
        bookings::list_owner_bookings,
        bookings::delete_booking,
    ),
    components(
        schemas(
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Items
            crate::models::item::Item,
            crate::models::item::ItemShort,
            crate::models::item::ItemView,
            crate::models::item::CreateItem,
            crate::models::item::UpdateItem,
            crate::models::comment::CreateComment,
            crate::models::comment::CommentView,
            // Item requests
            crate::models::request::CreateItemRequest,
            crate::models::request::ItemRequestView,
            crate::models::request::ItemAnswer,
            // Bookings
            bookings::CreateBookingRequest,
            crate::models::booking::BookingDetails,
            crate::models::booking::BookingShort,
            crate::models::booking::BookingStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User directory"),
        (name = "items", description = "Shared items and their comments"),
        (name = "requests", description = "Requests for items nobody shares yet"),
        (name = "bookings", description = "Booking lifecycle and listings")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
