//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Account & role errors
/// - 4xxx: Supply errors
/// - 5xxx: Notification & message errors
/// - 6xxx: Employee errors
/// - 7xxx: Knowledge base errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Account & role errors (3xxx)
    Account,
    /// Supply errors (4xxx)
    Supply,
    /// Notification & message errors (5xxx)
    Messaging,
    /// Employee errors (6xxx)
    Employee,
    /// Knowledge base errors (7xxx)
    Knowledge,
    /// System errors (8xxx, 9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Account,
            4000..5000 => Self::Supply,
            5000..6000 => Self::Messaging,
            6000..7000 => Self::Employee,
            7000..8000 => Self::Knowledge,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Account => "account",
            Self::Supply => "supply",
            Self::Messaging => "messaging",
            Self::Employee => "employee",
            Self::Knowledge => "knowledge",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Account);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Supply);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Messaging);
        assert_eq!(ErrorCategory::from_code(6001), ErrorCategory::Employee);
        assert_eq!(ErrorCategory::from_code(7001), ErrorCategory::Knowledge);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::NotOwner.category(), ErrorCategory::Permission);
        assert_eq!(ErrorCode::UnknownPermission.category(), ErrorCategory::Account);
        assert_eq!(ErrorCode::InsufficientStock.category(), ErrorCategory::Supply);
        assert_eq!(ErrorCode::MessageNotFound.category(), ErrorCategory::Messaging);
        assert_eq!(ErrorCode::ArticleNotFound.category(), ErrorCategory::Knowledge);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Messaging).unwrap();
        assert_eq!(json, "\"messaging\"");

        let category: ErrorCategory = serde_json::from_str("\"supply\"").unwrap();
        assert_eq!(category, ErrorCategory::Supply);
    }
}
