//! User model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// User model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Short user representation embedded in bookings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserShort {
    pub id: i64,
    pub name: String,
}

impl From<&User> for UserShort {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}

/// Create user request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Partial user update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_validation() {
        let ok = CreateUser {
            name: "Ivan".to_string(),
            email: "ivan@example.com".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = CreateUser {
            name: "Ivan".to_string(),
            email: "not-an-email".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let empty_name = CreateUser {
            name: String::new(),
            email: "ivan@example.com".to_string(),
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_update_user_validation() {
        assert!(UpdateUser::default().validate().is_ok());

        let rename = UpdateUser { name: Some("Petr".to_string()), email: None };
        assert!(rename.validate().is_ok());

        let bad = UpdateUser { name: None, email: Some("nope".to_string()) };
        assert!(bad.validate().is_err());
    }
}
