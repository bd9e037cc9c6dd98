//! 通知公告的可见性与编辑资格

use shared::models::Notification;
use sqlx::{QueryBuilder, Sqlite};

use super::{DepartmentScope, push_department_visibility};
use crate::auth::CurrentUser;
use crate::auth::guard::{Decision, Requirement};
use crate::auth::permissions::ROLE_ADMIN;

/// 超级管理员或管理员可以看到全部通知
pub fn can_view_all(user: &CurrentUser) -> bool {
    user.is_super_admin() || user.has_role(ROLE_ADMIN)
}

pub fn can_view(user: &CurrentUser, notification: &Notification) -> bool {
    can_view_all(user)
        || DepartmentScope::from_stored(notification.department.as_deref())
            .visible_to(&user.department)
}

/// 发布者本人或管理员；部门可见本身不授予编辑权
pub fn can_edit(user: &CurrentUser, notification: &Notification) -> bool {
    can_view_all(user) || notification.publisher_id == user.id
}

pub fn can_delete(user: &CurrentUser, notification: &Notification) -> bool {
    can_edit(user, notification)
}

pub fn check_view(user: &CurrentUser, notification: &Notification) -> Decision {
    Decision::require(can_view(user, notification), Requirement::Department)
}

pub fn check_edit(user: &CurrentUser, notification: &Notification) -> Decision {
    Decision::require(can_edit(user, notification), Requirement::Owner)
}

pub fn check_delete(user: &CurrentUser, notification: &Notification) -> Decision {
    Decision::require(can_delete(user, notification), Requirement::Owner)
}

/// 列表查询范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationScope {
    All,
    Visible { department: String },
}

impl NotificationScope {
    pub fn for_user(user: &CurrentUser) -> Self {
        if can_view_all(user) {
            Self::All
        } else {
            Self::Visible {
                department: user.department.clone(),
            }
        }
    }

    /// 追加 ` AND ...` 条件 (`alias` 为 notifications 表别名)
    pub fn push_filter(&self, qb: &mut QueryBuilder<'_, Sqlite>, alias: &str) {
        if let Self::Visible { department } = self {
            qb.push(" AND ");
            push_department_visibility(qb, &format!("{alias}.department"), department);
        }
    }
}
