//! Notification Model (通知公告)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Literal used by the portal for company-wide visibility
pub const COMPANY_WIDE: &str = "全公司";

/// Notification entity
///
/// `department == None` (or the legacy `全公司` literal) means company-wide.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub publisher_id: i64,
    pub publish_time: i64,
    pub is_top: bool,
    pub department: Option<String>,
    pub is_active: bool,
}

/// Notification joined with its publisher's display name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct NotificationView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub publisher_id: i64,
    pub publisher_name: String,
    pub publish_time: i64,
    pub is_top: bool,
    pub department: Option<String>,
    pub is_active: bool,
}

/// Create / edit payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotificationInput {
    #[validate(length(min = 1, max = 255, message = "请输入通知标题"))]
    pub title: String,
    #[validate(length(min = 1, message = "请输入通知内容"))]
    pub content: String,
    /// Blank, missing or `全公司` = company-wide
    pub department: Option<String>,
    #[serde(default)]
    pub is_top: bool,
}
