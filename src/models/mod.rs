//! Data models for ShareHub

pub mod booking;
pub mod comment;
pub mod item;
pub mod request;
pub mod user;

// Re-export commonly used types
pub use booking::{Booking, BookingDetails, BookingShort, BookingState, BookingStatus, BookingWindow, NewBooking};
pub use comment::{Comment, CommentView, NewComment};
pub use item::{Item, ItemShort, ItemView};
pub use request::{ItemRequest, ItemRequestView, NewItemRequest};
pub use user::{User, UserShort};
