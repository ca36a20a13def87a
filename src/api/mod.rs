//! API handlers for ShareHub REST endpoints

pub mod bookings;
pub mod comments;
pub mod extract;
pub mod health;
pub mod items;
pub mod openapi;
pub mod requests;
pub mod users;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::IntoParams;

use crate::AppState;

pub use extract::{AppJson, AppPath, AppQuery, SharerUserId, USER_ID_HEADER};

/// `from`/`size` paging parameters shared by listing endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Paging {
    /// Index of the first wanted row (default: 0)
    pub from: Option<i64>,
    /// Rows per page (default from configuration)
    pub size: Option<i64>,
}

impl Paging {
    /// `from` and `size` with their defaults filled in
    pub fn resolve(&self, default_size: i64) -> (i64, i64) {
        (self.from.unwrap_or(0), self.size.unwrap_or(default_size))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        // Items
        .route("/items", get(items::list_items).post(items::create_item))
        .route("/items/search", get(items::search_items))
        .route(
            "/items/:id",
            get(items::get_item)
                .patch(items::update_item)
                .delete(items::delete_item),
        )
        .route("/items/:id/comment", post(comments::create_comment))
        // Item requests
        .route("/requests", get(requests::list_own_requests).post(requests::create_request))
        .route("/requests/all", get(requests::list_all_requests))
        .route("/requests/:id", get(requests::get_request))
        // Bookings
        .route("/bookings", get(bookings::list_bookings).post(bookings::create_booking))
        .route("/bookings/owner", get(bookings::list_owner_bookings))
        .route(
            "/bookings/:id",
            get(bookings::get_booking)
                .patch(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
