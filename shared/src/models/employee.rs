//! Employee Models (人员档案)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default employment status
pub const STATUS_EMPLOYED: &str = "在职";

/// Employee record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    /// 工号 (unique)
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub position: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// `YYYY-MM-DD`
    pub hire_date: String,
    /// 在职 / 离职 / 休假
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create / edit payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmployeeInput {
    #[validate(length(min = 1, max = 50, message = "请输入工号"))]
    pub employee_id: String,
    #[validate(length(min = 1, max = 100, message = "请输入姓名"))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub department: String,
    #[validate(length(min = 1, max = 100, message = "请输入职位"))]
    pub position: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hire_date: String,
    pub status: Option<String>,
}

/// Search filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeQuery {
    pub department: Option<String>,
    pub keyword: Option<String>,
}

/// Employee file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct EmployeeFile {
    pub id: i64,
    pub employee_id: i64,
    pub file_name: String,
    pub file_type: String,
    pub file_path: String,
    pub uploader_id: i64,
    pub upload_time: i64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmployeeFileInput {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(length(min = 1, max = 50))]
    pub file_type: String,
    #[validate(length(min = 1, max = 500))]
    pub file_path: String,
    pub description: Option<String>,
}

/// Employee with attached files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeDetail {
    #[serde(flatten)]
    pub employee: Employee,
    pub files: Vec<EmployeeFile>,
}

/// Archive statistics (档案统计)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArchiveStats {
    pub total_employees: i64,
    pub active_employees: i64,
    pub departments: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveOverview {
    pub stats: ArchiveStats,
    pub employees: Vec<Employee>,
}
