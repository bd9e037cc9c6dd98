//! Entity Scoping Rules
//!
//! 按实体类型的可见性与操作资格判断。单条访问用纯谓词 (返回 bool 或
//! [`Decision`](crate::auth::guard::Decision))；列表查询把同一条规则渲染进
//! SQL `WHERE`，不在内存里过滤。
//!
//! 全公司可见统一用 [`DepartmentScope::CompanyWide`] 表示，持久化为 `NULL`。
//! 读取时 `NULL`、空串和历史字面量 `全公司` 都视为全公司。

pub mod message;
pub mod notification;
pub mod supply_request;

use shared::models::COMPANY_WIDE;
use sqlx::{QueryBuilder, Sqlite};

/// 部门可见范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepartmentScope {
    CompanyWide,
    Department(String),
}

impl DepartmentScope {
    /// 从存储值解析，兼容 `全公司` 与空串
    pub fn from_stored(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some(COMPANY_WIDE) => Self::CompanyWide,
            Some(dept) => Self::Department(dept.to_string()),
        }
    }

    /// 从请求参数解析 (规则同 [`Self::from_stored`])
    pub fn from_input(value: Option<String>) -> Self {
        Self::from_stored(value.as_deref())
    }

    /// 写入数据库的形式: 全公司为 `NULL`
    pub fn to_stored(&self) -> Option<String> {
        match self {
            Self::CompanyWide => None,
            Self::Department(dept) => Some(dept.clone()),
        }
    }

    pub fn is_company_wide(&self) -> bool {
        matches!(self, Self::CompanyWide)
    }

    /// 对 `department` 的用户是否可见
    pub fn visible_to(&self, department: &str) -> bool {
        match self {
            Self::CompanyWide => true,
            Self::Department(dept) => dept == department,
        }
    }
}

/// 追加 `(col IS NULL OR col = '' OR col = '全公司' OR col = ?)`
pub(crate) fn push_department_visibility(
    qb: &mut QueryBuilder<'_, Sqlite>,
    column: &str,
    department: &str,
) {
    qb.push("(")
        .push(column)
        .push(" IS NULL OR ")
        .push(column)
        .push(" = '' OR ")
        .push(column)
        .push(" = ")
        .push_bind(COMPANY_WIDE)
        .push(" OR ")
        .push(column)
        .push(" = ")
        .push_bind(department.to_string())
        .push(")");
}
