//! Error type for web handlers.
//!
//! [`AppError`] carries the HTTP status, a stable code for clients and a
//! user-facing message. Server errors keep their source for the log line
//! written when the response is built; clients never see it.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use carto_auth::AuthError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(caller: Caller) -> Result<Json<Pages>, AppError> {
///     let pages = auth.admin().global_allow_list(&caller.0).await?;
///     Ok(Json(Pages { pages }))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    code: &'static str,
    /// Logged on 5xx, never sent.
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Attach the underlying error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// 401 Unauthorized.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// 403 Forbidden.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// 409 Conflict.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    /// 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR", message)
    }

    /// 503 Service Unavailable.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", message)
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    error = %source,
                    "{}", self.message
                ),
                None => tracing::error!(status = %self.status, code = self.code, "{}", self.message),
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unconfigured => Self::internal("Authentication is not configured"),
            AuthError::InvalidToken { .. } => Self::unauthorized("Not signed in"),
            AuthError::InvalidCredentials => Self::unauthorized("Invalid credentials"),
            AuthError::Forbidden { .. } => Self::forbidden("Not allowed"),
            AuthError::AccountNotFound => Self::not_found("Account not found"),
            AuthError::LoginTaken => Self::conflict("This login is already taken"),
            AuthError::Validation(message) => Self::bad_request(message),
            AuthError::RemoteFetchError(_) => {
                Self::unavailable("Settings are unavailable").with_source(err.into())
            },
            AuthError::DatabaseError(_) | AuthError::InternalError(_) => {
                Self::internal("An internal error occurred").with_source(err.into())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_auth_errors_map_to_statuses() {
        let cases = [
            (AuthError::Unconfigured, StatusCode::INTERNAL_SERVER_ERROR),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidToken { reason: "expired" }, StatusCode::UNAUTHORIZED),
            (AuthError::Forbidden { path: "accounts".into() }, StatusCode::FORBIDDEN),
            (AuthError::AccountNotFound, StatusCode::NOT_FOUND),
            (AuthError::LoginTaken, StatusCode::CONFLICT),
            (AuthError::Validation("short".into()), StatusCode::BAD_REQUEST),
            (AuthError::RemoteFetchError("timeout".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AuthError::DatabaseError("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (auth, status) in cases {
            assert_eq!(AppError::from(auth.clone()).status(), status, "{auth}");
        }
    }

    #[test]
    fn test_validation_message_reaches_client() {
        let err = AppError::from(AuthError::Validation("Password too short".into()));
        assert_eq!(err.to_string(), "[BAD_REQUEST] Password too short");
    }

    #[test]
    fn test_system_errors_keep_source() {
        let err = AppError::from(AuthError::DatabaseError("connection refused".into()));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
    }
}
