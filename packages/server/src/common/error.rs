//! Error taxonomy surfaced by domain actions.
//!
//! Infrastructure (stores, indexer, realtime) speaks `anyhow`; anything that
//! escapes into an action without being classified is a fatal `Internal`.
//! Best-effort steps never produce a `ForumError` at all: they are caught and
//! logged where they run.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use super::auth::AuthError;

#[derive(Error, Debug)]
pub enum ForumError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

pub type ForumResult<T> = std::result::Result<T, ForumError>;

impl ForumError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ForumError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationRequired => Self::Unauthenticated,
            AuthError::Internal(e) => Self::Internal(e),
            other => Self::Forbidden(other.to_string()),
        }
    }
}

impl IntoResponse for ForumError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ForumError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ForumError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(ForumError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ForumError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ForumError::from(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_errors_map_to_forbidden() {
        let err: ForumError = AuthError::ModeratorRequired.into();
        assert!(matches!(err, ForumError::Forbidden(_)));

        let err: ForumError = AuthError::AuthenticationRequired.into();
        assert!(matches!(err, ForumError::Unauthenticated));
    }
}
