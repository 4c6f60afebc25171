use std::fmt;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use bookstore_core::error::error_response;
use bookstore_domain::policy::DenyReason;

/// Entity kinds named in not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Category,
    Author,
    Book,
    Review,
    User,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Category => "category",
            Self::Author => "author",
            Self::Book => "book",
            Self::Review => "review",
            Self::User => "user",
        })
    }
}

/// API service error variants.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Duplicate(&'static str),
    #[error("{0} not found")]
    NotFound(Entity),
    #[error("you do not have permission to perform this action")]
    Permission,
    #[error("authentication credentials were not provided")]
    AuthenticationRequired,
    #[error("{0}")]
    Authentication(&'static str),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Duplicate(_) => "DUPLICATE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Permission => "PERMISSION_DENIED",
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::Authentication(_) => "AUTHENTICATION_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Duplicate(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Permission => StatusCode::FORBIDDEN,
            Self::AuthenticationRequired | Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DenyReason> for ServiceError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::AuthenticationRequired => Self::AuthenticationRequired,
            DenyReason::NotOwner => Self::Permission,
        }
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ServiceError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        // 4xx are expected client errors; only 500s are logged, with the full chain.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        error_response(self.status(), self.kind(), self.to_string())
    }
}
