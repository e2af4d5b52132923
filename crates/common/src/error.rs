//! Error types for sietch.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
///
/// Business-rule variants are safe to show to the end user verbatim.
/// Only [`AppError::StoreUnavailable`] is worth retrying.
#[derive(Debug, Error)]
pub enum AppError {
    // === Input Errors ===
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    // === Business Rule Violations ===
    #[error("Only the host can perform this action")]
    NotHost,

    #[error("Hosts cannot apply to their own group")]
    HostSelfApply,

    #[error("Player is already engaged in an active group")]
    AlreadyEngaged,

    #[error("Host already has an open group")]
    HostAlreadyActive,

    #[error("Group is full")]
    GroupFull,

    #[error("Group is not accepting players: {0}")]
    GroupUnavailable(String),

    #[error("Player does not meet the group requirements")]
    NotEligible,

    #[error("Player has already applied to this group")]
    AlreadyApplied,

    #[error("Application has already been declined")]
    MatchAlreadyDecided,

    #[error("Rating already submitted for this player in this group")]
    DuplicateRating,

    #[error("Rating window is closed")]
    RatingWindowClosed,

    #[error("Player is not a member of this group")]
    NotGroupMember,

    #[error("Conflict: {0}")]
    Conflict(String),

    // === Infrastructure Errors ===
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotHost | Self::NotGroupMember | Self::NotEligible => StatusCode::FORBIDDEN,
            Self::HostSelfApply
            | Self::AlreadyEngaged
            | Self::HostAlreadyActive
            | Self::GroupFull
            | Self::GroupUnavailable(_)
            | Self::AlreadyApplied
            | Self::MatchAlreadyDecided
            | Self::DuplicateRating
            | Self::RatingWindowClosed
            | Self::Conflict(_) => StatusCode::CONFLICT,

            // 5xx Server Errors
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotHost => "NOT_HOST",
            Self::HostSelfApply => "HOST_SELF_APPLY",
            Self::AlreadyEngaged => "ALREADY_ENGAGED",
            Self::HostAlreadyActive => "HOST_ALREADY_ACTIVE",
            Self::GroupFull => "GROUP_FULL",
            Self::GroupUnavailable(_) => "GROUP_UNAVAILABLE",
            Self::NotEligible => "NOT_ELIGIBLE",
            Self::AlreadyApplied => "ALREADY_APPLIED",
            Self::MatchAlreadyDecided => "MATCH_ALREADY_DECIDED",
            Self::DuplicateRating => "DUPLICATE_RATING",
            Self::RatingWindowClosed => "RATING_WINDOW_CLOSED",
            Self::NotGroupMember => "NOT_GROUP_MEMBER",
            Self::Conflict(_) => "CONFLICT",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Returns whether the caller may retry the operation with backoff.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server errors
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_errors_are_client_errors() {
        let errors = [
            AppError::NotHost,
            AppError::HostSelfApply,
            AppError::AlreadyEngaged,
            AppError::GroupFull,
            AppError::DuplicateRating,
            AppError::RatingWindowClosed,
        ];

        for err in errors {
            assert!(err.status_code().is_client_error(), "{err:?}");
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn test_store_unavailable_is_retryable() {
        let err = AppError::StoreUnavailable("connection reset".to_string());
        assert!(err.is_retryable());
        assert!(err.is_server_error());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let mut codes = vec![
            AppError::NotHost.error_code(),
            AppError::HostSelfApply.error_code(),
            AppError::AlreadyEngaged.error_code(),
            AppError::HostAlreadyActive.error_code(),
            AppError::GroupFull.error_code(),
            AppError::NotEligible.error_code(),
            AppError::AlreadyApplied.error_code(),
            AppError::MatchAlreadyDecided.error_code(),
            AppError::DuplicateRating.error_code(),
            AppError::RatingWindowClosed.error_code(),
            AppError::NotGroupMember.error_code(),
        ];
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn test_not_found_status() {
        let err = AppError::NotFound("Group not found: g1".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "NOT_FOUND");
    }
}
