//! 耗材申请的查询范围与状态转换守卫

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::RequestStatus;
use sqlx::{QueryBuilder, Sqlite};

use crate::auth::CurrentUser;
use crate::auth::guard::{Decision, Requirement};
use crate::auth::permissions::{APPROVE_REQUESTS, ROLE_ADMIN};

/// 是否可跨部门处理申请: 只看 admin 角色，超级管理员的绕过只作用于权限判断
pub fn is_request_admin(user: &CurrentUser) -> bool {
    user.has_role(ROLE_ADMIN)
}

/// 申请列表范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestScope {
    /// 全部申请
    All,
    /// 申请人属于该部门
    Department(String),
    /// 仅本人提交的
    Own(i64),
}

impl RequestScope {
    pub fn for_user(user: &CurrentUser) -> Self {
        if !user.has_permission(APPROVE_REQUESTS) {
            Self::Own(user.id)
        } else if is_request_admin(user) {
            Self::All
        } else {
            Self::Department(user.department.clone())
        }
    }

    /// 追加 ` AND ...` 条件；`request` / `applicant` 为 supply_requests 与 users 的别名
    pub fn push_filter(&self, qb: &mut QueryBuilder<'_, Sqlite>, request: &str, applicant: &str) {
        match self {
            Self::All => {}
            Self::Department(dept) => {
                qb.push(" AND ")
                    .push(applicant)
                    .push(".department = ")
                    .push_bind(dept.clone());
            }
            Self::Own(user_id) => {
                qb.push(" AND ")
                    .push(request)
                    .push(".applicant_id = ")
                    .push_bind(*user_id);
            }
        }
    }

    /// 单条申请是否落在范围内
    pub fn covers(&self, applicant_id: i64, applicant_department: &str) -> bool {
        match self {
            Self::All => true,
            Self::Department(dept) => dept == applicant_department,
            Self::Own(user_id) => *user_id == applicant_id,
        }
    }
}

/// 非管理员审批人只能处理本部门的申请
pub fn check_approver_department(user: &CurrentUser, applicant_department: &str) -> Decision {
    let allowed = is_request_admin(user) || user.department == applicant_department;
    if !allowed {
        crate::security_log!(
            "WARN",
            "cross_department_approval",
            user_id = user.id,
            department = user.department.as_str(),
            applicant_department = applicant_department
        );
    }
    Decision::require(allowed, Requirement::Department)
}

/// 审批/拒绝只允许从 pending 开始
pub fn ensure_decidable(status: RequestStatus) -> AppResult<()> {
    if status != RequestStatus::Pending {
        return Err(AppError::invalid_state(
            ErrorCode::RequestNotPending,
            RequestStatus::Pending.as_str(),
            status.as_str(),
        ));
    }
    Ok(())
}

/// 发放只允许从 approved 开始
pub fn ensure_issuable(status: RequestStatus) -> AppResult<()> {
    if status != RequestStatus::Approved {
        return Err(AppError::with_message(
            ErrorCode::RequestNotApproved,
            "只能发放已批准的申请",
        )
        .with_detail("expected", RequestStatus::Approved.as_str())
        .with_detail("actual", status.as_str()));
    }
    Ok(())
}

pub fn ensure_stock(current_stock: i64, quantity: i64) -> AppResult<()> {
    if current_stock < quantity {
        return Err(AppError::with_message(
            ErrorCode::InsufficientStock,
            format!("库存不足！当前库存: {current_stock}"),
        )
        .with_detail("current_stock", current_stock)
        .with_detail("requested", quantity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permissions::{ROLE_SUPER_ADMIN, ROLE_USER};
    use shared::models::Role;

    fn user(id: i64, department: &str, role: &str, perms: &str) -> CurrentUser {
        let role = Role {
            id: 1,
            name: role.into(),
            description: None,
            permissions: perms.into(),
            level: 2,
        };
        CurrentUser::new(id, format!("user{id}"), department, &[role])
    }

    #[test]
    fn test_scope_selection() {
        let admin = user(1, "行政部", ROLE_ADMIN, "approve_requests");
        assert_eq!(RequestScope::for_user(&admin), RequestScope::All);

        // 超级管理员有审批权，但没有 admin 角色，范围仍是本部门
        let root = user(2, "管理员", ROLE_SUPER_ADMIN, "");
        assert_eq!(
            RequestScope::for_user(&root),
            RequestScope::Department("管理员".into())
        );

        let lead = user(3, "技术部", "team_lead", "approve_requests");
        assert_eq!(
            RequestScope::for_user(&lead),
            RequestScope::Department("技术部".into())
        );

        let staff = user(4, "技术部", ROLE_USER, "request_supplies");
        assert_eq!(RequestScope::for_user(&staff), RequestScope::Own(4));
    }

    #[test]
    fn test_admin_without_approve_permission_sees_own_only() {
        let admin = user(1, "行政部", ROLE_ADMIN, "view_supplies");
        assert_eq!(RequestScope::for_user(&admin), RequestScope::Own(1));
    }

    #[test]
    fn test_covers() {
        let dept = RequestScope::Department("技术部".into());
        assert!(dept.covers(9, "技术部"));
        assert!(!dept.covers(9, "人事部"));
        assert!(RequestScope::Own(4).covers(4, "人事部"));
        assert!(!RequestScope::Own(4).covers(5, "技术部"));
    }

    #[test]
    fn test_filter_sql() {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT r.id FROM supply_requests r JOIN users a ON a.id = r.applicant_id WHERE 1 = 1");
        RequestScope::Department("技术部".into()).push_filter(&mut qb, "r", "a");
        assert!(qb.sql().ends_with(" AND a.department = ?"));

        let mut qb = QueryBuilder::<Sqlite>::new("WHERE 1 = 1");
        RequestScope::Own(3).push_filter(&mut qb, "r", "a");
        assert_eq!(qb.sql(), "WHERE 1 = 1 AND r.applicant_id = ?");
    }

    #[test]
    fn test_cross_department_approval_denied() {
        let lead = user(3, "技术部", "team_lead", "approve_requests");
        assert!(check_approver_department(&lead, "技术部").is_allowed());
        let err = check_approver_department(&lead, "人事部")
            .into_result()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DepartmentMismatch);

        let admin = user(1, "行政部", ROLE_ADMIN, "approve_requests");
        assert!(check_approver_department(&admin, "人事部").is_allowed());
    }

    #[test]
    fn test_super_admin_alone_cannot_approve_across_departments() {
        let root = user(2, "管理员", ROLE_SUPER_ADMIN, "");
        assert!(root.has_permission(APPROVE_REQUESTS));
        assert!(!is_request_admin(&root));
        assert!(check_approver_department(&root, "管理员").is_allowed());
        let err = check_approver_department(&root, "技术部")
            .into_result()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DepartmentMismatch);
    }

    #[test]
    fn test_transition_guards() {
        assert!(ensure_decidable(RequestStatus::Pending).is_ok());
        let err = ensure_decidable(RequestStatus::Approved).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequestNotPending);
        assert_eq!(err.details.unwrap()["expected"], "pending");

        assert!(ensure_issuable(RequestStatus::Approved).is_ok());
        let err = ensure_issuable(RequestStatus::Pending).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequestNotApproved);
        assert!(ensure_issuable(RequestStatus::Issued).is_err());
    }

    #[test]
    fn test_stock_check() {
        assert!(ensure_stock(10, 10).is_ok());
        let err = ensure_stock(5, 10).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.details.unwrap()["current_stock"], 5);
    }
}
