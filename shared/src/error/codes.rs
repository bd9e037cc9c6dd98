//! Unified error codes for the office portal
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account & role errors
//! - 4xxx: Supply errors
//! - 5xxx: Notification & message errors
//! - 6xxx: Employee errors
//! - 7xxx: Knowledge base errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password/approval)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled or not approved
    AccountDisabled = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Only the owner may perform this action
    NotOwner = 2003,
    /// Action limited to the caller's own department
    DepartmentMismatch = 2004,

    // ==================== 3xxx: Account & Role ====================
    /// User not found
    UserNotFound = 3001,
    /// Username already taken
    UsernameExists = 3002,
    /// User is not waiting for approval
    UserNotPending = 3003,
    /// Role not found
    RoleNotFound = 3101,
    /// Permission identifier not in catalog
    UnknownPermission = 3102,

    // ==================== 4xxx: Supply ====================
    /// Supply not found
    SupplyNotFound = 4001,
    /// Supply is disabled
    SupplyUnavailable = 4002,
    /// Not enough stock
    InsufficientStock = 4003,
    /// Supply category not found
    SupplyCategoryNotFound = 4101,
    /// Supply category still has supplies
    SupplyCategoryInUse = 4102,
    /// Supply request not found
    RequestNotFound = 4201,
    /// Supply request is not pending
    RequestNotPending = 4202,
    /// Supply request is not approved
    RequestNotApproved = 4203,
    /// Supply request was handled concurrently
    RequestAlreadyHandled = 4204,

    // ==================== 5xxx: Notification & Message ====================
    /// Notification not found
    NotificationNotFound = 5001,
    /// Message not found
    MessageNotFound = 5101,
    /// Message recipient not found or inactive
    RecipientNotFound = 5102,

    // ==================== 6xxx: Employee ====================
    /// Employee not found
    EmployeeNotFound = 6001,
    /// Employee number already exists
    EmployeeIdExists = 6002,

    // ==================== 7xxx: Knowledge ====================
    /// Knowledge category not found
    KnowledgeCategoryNotFound = 7001,
    /// Knowledge category has subcategories
    KnowledgeCategoryHasChildren = 7002,
    /// Knowledge category has articles
    KnowledgeCategoryHasArticles = 7003,
    /// Category parent would create a cycle
    KnowledgeCategoryCycle = 7004,
    /// Knowledge article not found
    ArticleNotFound = 7101,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::NotOwner => "Only the owner can perform this action",
            ErrorCode::DepartmentMismatch => "Action is limited to your own department",

            // Account & Role
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::UserNotPending => "User is not pending approval",
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::UnknownPermission => "Unknown permission identifier",

            // Supply
            ErrorCode::SupplyNotFound => "Supply not found",
            ErrorCode::SupplyUnavailable => "Supply is not available",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::SupplyCategoryNotFound => "Supply category not found",
            ErrorCode::SupplyCategoryInUse => "Supply category still has supplies",
            ErrorCode::RequestNotFound => "Supply request not found",
            ErrorCode::RequestNotPending => "Supply request is not pending",
            ErrorCode::RequestNotApproved => "Supply request is not approved",
            ErrorCode::RequestAlreadyHandled => "Supply request has already been handled",

            // Notification & Message
            ErrorCode::NotificationNotFound => "Notification not found",
            ErrorCode::MessageNotFound => "Message not found",
            ErrorCode::RecipientNotFound => "Recipient not found",

            // Employee
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::EmployeeIdExists => "Employee number already exists",

            // Knowledge
            ErrorCode::KnowledgeCategoryNotFound => "Knowledge category not found",
            ErrorCode::KnowledgeCategoryHasChildren => "Knowledge category has subcategories",
            ErrorCode::KnowledgeCategoryHasArticles => "Knowledge category has articles",
            ErrorCode::KnowledgeCategoryCycle => "Category cannot be moved under itself",
            ErrorCode::ArticleNotFound => "Knowledge article not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 to [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::NotOwner),
            2004 => Ok(ErrorCode::DepartmentMismatch),

            // Account & Role
            3001 => Ok(ErrorCode::UserNotFound),
            3002 => Ok(ErrorCode::UsernameExists),
            3003 => Ok(ErrorCode::UserNotPending),
            3101 => Ok(ErrorCode::RoleNotFound),
            3102 => Ok(ErrorCode::UnknownPermission),

            // Supply
            4001 => Ok(ErrorCode::SupplyNotFound),
            4002 => Ok(ErrorCode::SupplyUnavailable),
            4003 => Ok(ErrorCode::InsufficientStock),
            4101 => Ok(ErrorCode::SupplyCategoryNotFound),
            4102 => Ok(ErrorCode::SupplyCategoryInUse),
            4201 => Ok(ErrorCode::RequestNotFound),
            4202 => Ok(ErrorCode::RequestNotPending),
            4203 => Ok(ErrorCode::RequestNotApproved),
            4204 => Ok(ErrorCode::RequestAlreadyHandled),

            // Notification & Message
            5001 => Ok(ErrorCode::NotificationNotFound),
            5101 => Ok(ErrorCode::MessageNotFound),
            5102 => Ok(ErrorCode::RecipientNotFound),

            // Employee
            6001 => Ok(ErrorCode::EmployeeNotFound),
            6002 => Ok(ErrorCode::EmployeeIdExists),

            // Knowledge
            7001 => Ok(ErrorCode::KnowledgeCategoryNotFound),
            7002 => Ok(ErrorCode::KnowledgeCategoryHasChildren),
            7003 => Ok(ErrorCode::KnowledgeCategoryHasArticles),
            7004 => Ok(ErrorCode::KnowledgeCategoryCycle),
            7101 => Ok(ErrorCode::ArticleNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}
