mod login;
mod register;
mod send_code;

pub use login::login_with_code;
pub use register::register_with_code;
pub use send_code::send_verification_code;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};

use super::error_body;
use crate::verification::VerifyError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Verification(#[from] VerifyError),
    #[error("User not found, please register first")]
    UserNotFound,
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("Failed to send the verification email, try again later")]
    Delivery(#[source] anyhow::Error),
    #[error("Something went wrong")]
    Unexpected(#[from] anyhow::Error),
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Verification(_) => StatusCode::BAD_REQUEST,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::Delivery(_) | Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(error_body(self.status_code(), self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_failures_map_to_bad_request() {
        for error in [
            VerifyError::NotFound,
            VerifyError::Expired,
            VerifyError::TooManyAttempts,
            VerifyError::CodeMismatch {
                attempts_remaining: 2,
            },
        ] {
            assert_eq!(
                AuthError::from(error).status_code(),
                StatusCode::BAD_REQUEST
            );
        }
    }

    #[test]
    fn missing_users_map_to_not_found() {
        assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn duplicate_emails_map_to_conflict() {
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn delivery_failures_map_to_internal_server_error() {
        let error = AuthError::Delivery(anyhow::anyhow!("connection reset"));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
