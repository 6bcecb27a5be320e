use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::password::PasswordError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User not found")]
    UserNotFound,
    #[error("Email already exists")]
    EmailAlreadyExists,
    #[error("Account not activated")]
    AccountNotActivated,
    #[error("Invalid or expired code")]
    InvalidOtp,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing authorization header")]
    MissingAuthHeader,
    #[error("Invalid authorization header format")]
    InvalidAuthHeaderFormat,
    #[error("Insufficient permissions")]
    InsufficientPermissions,
    #[error("Password validation failed: {0}")]
    PasswordValidation(String),
    #[error("Email validation failed: {0}")]
    EmailValidation(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Password hashing error: {0}")]
    PasswordHashing(PasswordError),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Policy violations are the caller's fault and map to the 400 validation
/// variant; only genuine bcrypt failures stay internal.
impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::HashingFailed | PasswordError::VerificationFailed => {
                AuthError::PasswordHashing(err)
            }
            policy_violation => AuthError::PasswordValidation(policy_violation.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            AuthError::EmailAlreadyExists => (StatusCode::CONFLICT, "Email already exists"),
            AuthError::AccountNotActivated => (StatusCode::FORBIDDEN, "Account not activated"),
            AuthError::InvalidOtp => (StatusCode::BAD_REQUEST, "Invalid or expired code"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
            AuthError::MissingAuthHeader => {
                (StatusCode::UNAUTHORIZED, "Missing authorization header")
            }
            AuthError::InvalidAuthHeaderFormat => {
                (StatusCode::UNAUTHORIZED, "Invalid authorization header format")
            }
            AuthError::InsufficientPermissions => {
                (StatusCode::FORBIDDEN, "Insufficient permissions")
            }
            AuthError::PasswordValidation(reason) => (StatusCode::BAD_REQUEST, reason.as_str()),
            AuthError::EmailValidation(_) => (StatusCode::BAD_REQUEST, "Email validation failed"),
            AuthError::Database(err) => {
                tracing::error!("auth database error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AuthError::Jwt(_) => (StatusCode::UNAUTHORIZED, "Token error"),
            AuthError::PasswordHashing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Password processing error")
            }
            AuthError::Internal(err) => {
                tracing::error!("auth internal error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;

    #[test]
    fn weak_password_is_a_bad_request() {
        let err: AuthError = hash_password("short").unwrap_err().into();
        assert!(matches!(err, AuthError::PasswordValidation(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn bcrypt_failure_stays_internal() {
        let err: AuthError = PasswordError::HashingFailed.into();
        assert!(matches!(err, AuthError::PasswordHashing(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
