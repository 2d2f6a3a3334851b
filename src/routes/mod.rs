mod auth;
mod health;
mod users;

pub use auth::{login_with_code, register_with_code, send_verification_code};
pub use health::report_health;
pub use users::{create_user, delete_user, get_user, list_users, update_user};

use actix_web::http::StatusCode;
use serde::Serialize;

/// Response envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: Some(message.into()),
        }
    }
}

pub(crate) fn error_body(
    status: StatusCode,
    error: impl std::fmt::Display,
) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "error": error.to_string(),
        "message": format!("HTTP {} Error", status.as_u16()),
    })
}
