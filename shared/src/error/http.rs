//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::UserNotFound
            | Self::RoleNotFound
            | Self::SupplyNotFound
            | Self::SupplyCategoryNotFound
            | Self::RequestNotFound
            | Self::NotificationNotFound
            | Self::MessageNotFound
            | Self::RecipientNotFound
            | Self::EmployeeNotFound
            | Self::KnowledgeCategoryNotFound
            | Self::ArticleNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict (duplicates, illegal state transitions, exhausted stock)
            Self::AlreadyExists
            | Self::UsernameExists
            | Self::UserNotPending
            | Self::SupplyUnavailable
            | Self::InsufficientStock
            | Self::SupplyCategoryInUse
            | Self::RequestNotPending
            | Self::RequestNotApproved
            | Self::RequestAlreadyHandled
            | Self::EmployeeIdExists
            | Self::KnowledgeCategoryHasChildren
            | Self::KnowledgeCategoryHasArticles => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::NotOwner
            | Self::DepartmentMismatch => StatusCode::FORBIDDEN,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::RequestNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::MessageNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_auth_and_permission_are_distinct() {
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::PermissionDenied.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::NotOwner.http_status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_state_conflicts() {
        assert_eq!(ErrorCode::RequestNotPending.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::InsufficientStock.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::RequestAlreadyHandled.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_validation_defaults_to_bad_request() {
        assert_eq!(ErrorCode::ValidationFailed.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::UnknownPermission.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::KnowledgeCategoryCycle.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_system_errors() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
