//! 耗材申请工作流
//!
//! 提交、审批、发放各自在一个事务中完成；状态更新都是带前置状态的
//! 条件更新，未命中即回滚。

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    DecisionAction, MessageType, NewMessage, RequestDecision, RequestStatus, SupplyRequestCreate,
    SupplyRequestView,
};
use sqlx::{SqliteConnection, SqlitePool};

use crate::auth::CurrentUser;
use crate::auth::permissions::APPROVE_REQUESTS;
use crate::db::repository::{
    self, message as message_repo, role as role_repo, supply as supply_repo,
    supply_request as request_repo, user as user_repo,
};
use crate::scope::supply_request::{
    RequestScope, check_approver_department, ensure_decidable, ensure_issuable, ensure_stock,
};

/// 当前用户范围内的申请
pub async fn list(
    pool: &SqlitePool,
    user: &CurrentUser,
    status: Option<RequestStatus>,
) -> AppResult<Vec<SupplyRequestView>> {
    let scope = RequestScope::for_user(user);
    Ok(request_repo::list(pool, &scope, status, None).await?)
}

/// 提交申请并通知可以审批它的人
pub async fn submit(
    pool: &SqlitePool,
    applicant: &CurrentUser,
    req: &SupplyRequestCreate,
) -> AppResult<SupplyRequestView> {
    let mut tx = repository::begin(pool).await?;

    let supply = supply_repo::find_by_id(&mut *tx, req.supply_id)
        .await?
        .ok_or_else(|| supply_not_found(req.supply_id))?;
    if !supply.is_available {
        return Err(AppError::with_message(
            ErrorCode::SupplyUnavailable,
            format!("耗材 {} 已停用", supply.name),
        ));
    }
    ensure_stock(supply.current_stock, req.quantity)?;

    let id = request_repo::create(&mut tx, applicant.id, supply.id, req.quantity).await?;

    let title = "新的耗材申请待审批";
    let content = format!(
        "用户 {} 提交了耗材申请：{} x {}，请及时审批。",
        applicant.display_name(),
        supply.name,
        req.quantity
    );
    let approvers = approvers_for(&mut tx, applicant).await?;
    for approver_id in &approvers {
        let msg = NewMessage::new(applicant.id, *approver_id, title, content.as_str())
            .with_type(MessageType::Approval)
            .with_related_url(format!("/api/requests/{id}"));
        message_repo::insert(&mut tx, &msg).await?;
    }

    let view = request_repo::find_view(&mut *tx, id)
        .await?
        .ok_or_else(|| request_not_found(id))?;
    repository::commit(tx).await?;

    tracing::info!(
        request_id = id,
        applicant_id = applicant.id,
        supply_id = supply.id,
        quantity = req.quantity,
        notified = approvers.len(),
        "Supply request submitted"
    );
    Ok(view)
}

/// 有审批权的已审核用户中，超级管理员与申请人同部门者 (不含申请人本人)
async fn approvers_for(
    conn: &mut SqliteConnection,
    applicant: &CurrentUser,
) -> AppResult<Vec<i64>> {
    let users = user_repo::find_approved(&mut *conn).await?;
    let mut ids = Vec::new();
    for user in users {
        if user.id == applicant.id {
            continue;
        }
        let roles = role_repo::find_by_user(&mut *conn, user.id).await?;
        let candidate = CurrentUser::from_user(&user, &roles);
        if candidate.has_permission(APPROVE_REQUESTS)
            && (candidate.is_super_admin() || candidate.department == applicant.department)
        {
            ids.push(user.id);
        }
    }
    Ok(ids)
}

/// 批准或拒绝，并通知申请人
pub async fn decide(
    pool: &SqlitePool,
    approver: &CurrentUser,
    request_id: i64,
    decision: &RequestDecision,
) -> AppResult<SupplyRequestView> {
    let mut tx = repository::begin(pool).await?;
    let view = request_repo::find_view(&mut *tx, request_id)
        .await?
        .ok_or_else(|| request_not_found(request_id))?;

    check_approver_department(approver, &view.applicant_department).into_result()?;
    ensure_decidable(view.status)?;

    let reason = shared::util::non_blank(decision.reject_reason.clone());
    let (to, title, content) = match decision.action {
        DecisionAction::Approve => (
            RequestStatus::Approved,
            "耗材申请已批准",
            format!("您的耗材申请（{} x {}）已获批准。", view.supply_name, view.quantity),
        ),
        DecisionAction::Reject => (
            RequestStatus::Rejected,
            "耗材申请被拒绝",
            format!(
                "您的耗材申请（{} x {}）已被拒绝。原因：{}",
                view.supply_name,
                view.quantity,
                reason.as_deref().unwrap_or("无")
            ),
        ),
    };
    let stored_reason = match to {
        RequestStatus::Rejected => reason.as_deref(),
        _ => None,
    };

    if !request_repo::decide(&mut tx, request_id, approver.id, to, stored_reason).await? {
        return Err(already_handled(request_id));
    }
    let msg = NewMessage::new(approver.id, view.applicant_id, title, content)
        .with_related_url(format!("/api/requests/{request_id}"));
    message_repo::insert(&mut tx, &msg).await?;

    let updated = request_repo::find_view(&mut *tx, request_id)
        .await?
        .ok_or_else(|| request_not_found(request_id))?;
    repository::commit(tx).await?;

    tracing::info!(
        request_id,
        approver_id = approver.id,
        status = %to,
        "Supply request decided"
    );
    Ok(updated)
}

/// 发放已批准的申请并扣减库存
pub async fn issue(
    pool: &SqlitePool,
    issuer: &CurrentUser,
    request_id: i64,
) -> AppResult<SupplyRequestView> {
    let mut tx = repository::begin(pool).await?;
    let request = request_repo::find_by_id(&mut *tx, request_id)
        .await?
        .ok_or_else(|| request_not_found(request_id))?;
    ensure_issuable(request.status)?;

    let supply = supply_repo::find_by_id(&mut *tx, request.supply_id)
        .await?
        .ok_or_else(|| supply_not_found(request.supply_id))?;
    ensure_stock(supply.current_stock, request.quantity)?;

    if !supply_repo::take_stock(&mut tx, supply.id, request.quantity).await? {
        return Err(AppError::with_message(
            ErrorCode::InsufficientStock,
            "库存不足，发放失败",
        ));
    }
    if !request_repo::mark_issued(&mut tx, request_id, issuer.id).await? {
        return Err(already_handled(request_id));
    }

    let view = request_repo::find_view(&mut *tx, request_id)
        .await?
        .ok_or_else(|| request_not_found(request_id))?;
    repository::commit(tx).await?;

    tracing::info!(
        request_id,
        issuer_id = issuer.id,
        supply_id = supply.id,
        quantity = request.quantity,
        "Supplies issued"
    );
    Ok(view)
}

fn supply_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::SupplyNotFound, format!("Supply {id} not found"))
}

fn request_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::RequestNotFound, format!("Request {id} not found"))
}

fn already_handled(id: i64) -> AppError {
    AppError::with_message(ErrorCode::RequestAlreadyHandled, "该申请已被处理")
        .with_detail("request_id", id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permissions::{ROLE_ADMIN, ROLE_SUPER_ADMIN, ROLE_USER};
    use crate::scope::message::MessageScope;
    use crate::testing;
    use shared::models::{MessageFilter, SupplyInput};

    async fn supply(pool: &SqlitePool, stock: i64) -> i64 {
        let input = SupplyInput {
            name: "A4打印纸".into(),
            category_id: None,
            total_stock: stock,
            current_stock: stock,
            unit: "包".into(),
            min_stock_threshold: 1,
            description: None,
        };
        supply_repo::create(pool, &input).await.unwrap().id
    }

    fn create(supply_id: i64, quantity: i64) -> SupplyRequestCreate {
        SupplyRequestCreate {
            supply_id,
            quantity,
        }
    }

    fn approve() -> RequestDecision {
        RequestDecision {
            action: DecisionAction::Approve,
            reject_reason: None,
        }
    }

    async fn inbox(pool: &SqlitePool, user: &CurrentUser) -> Vec<shared::models::MessageView> {
        message_repo::list(pool, &MessageScope::for_user(user), MessageFilter::All)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_rejects_quantity_over_stock() {
        let pool = testing::pool_with_roles().await;
        let staff = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let supply_id = supply(&pool, 5).await;

        let err = submit(&pool, &staff, &create(supply_id, 10)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.details.unwrap()["current_stock"], 5);

        let mine = list(&pool, &staff, None).await.unwrap();
        assert!(mine.is_empty());
    }

    #[tokio::test]
    async fn test_submit_notifies_approvers_except_applicant() {
        let pool = testing::pool_with_roles().await;
        let root = testing::create_user(&pool, "superadmin", "管理员", ROLE_SUPER_ADMIN).await;
        let tech_admin = testing::create_user(&pool, "wangqiang", "技术部", ROLE_ADMIN).await;
        let other_admin = testing::create_user(&pool, "admin", "行政部", ROLE_ADMIN).await;
        let staff = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let peer = testing::create_user(&pool, "lisi", "技术部", ROLE_USER).await;
        let supply_id = supply(&pool, 20).await;

        let view = submit(&pool, &staff, &create(supply_id, 3)).await.unwrap();
        assert_eq!(view.status, RequestStatus::Pending);
        assert_eq!(view.applicant_department, "技术部");

        let tech_inbox = inbox(&pool, &tech_admin).await;
        assert_eq!(tech_inbox.len(), 1);
        assert_eq!(tech_inbox[0].title, "新的耗材申请待审批");
        assert_eq!(tech_inbox[0].message_type, MessageType::Approval);
        assert_eq!(tech_inbox[0].sender_id, staff.id);
        assert_eq!(inbox(&pool, &root).await.len(), 1);
        // 其他部门的 admin 不收待审批提醒，无审批权的同事也不收
        assert!(inbox(&pool, &other_admin).await.is_empty());
        assert!(inbox(&pool, &peer).await.is_empty());

        // 超级管理员自己提交时不通知自己
        submit(&pool, &root, &create(supply_id, 1)).await.unwrap();
        assert_eq!(inbox(&pool, &root).await.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_unavailable_supply() {
        let pool = testing::pool_with_roles().await;
        let staff = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let supply_id = supply(&pool, 20).await;
        supply_repo::set_available(&pool, supply_id, false).await.unwrap();

        let err = submit(&pool, &staff, &create(supply_id, 1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SupplyUnavailable);
        let err = submit(&pool, &staff, &create(999, 1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SupplyNotFound);
    }

    #[tokio::test]
    async fn test_decided_request_cannot_be_decided_again() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_ADMIN).await;
        let staff = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let supply_id = supply(&pool, 20).await;
        let view = submit(&pool, &staff, &create(supply_id, 2)).await.unwrap();

        let approved = decide(&pool, &admin, view.id, &approve()).await.unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.approver_id, Some(admin.id));

        let reject = RequestDecision {
            action: DecisionAction::Reject,
            reject_reason: Some("重复申请".into()),
        };
        let err = decide(&pool, &admin, view.id, &reject).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RequestNotPending);

        let staff_inbox = inbox(&pool, &staff).await;
        assert_eq!(staff_inbox.len(), 1);
        assert_eq!(staff_inbox[0].title, "耗材申请已批准");
    }

    #[tokio::test]
    async fn test_reject_records_reason() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_ADMIN).await;
        let staff = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let supply_id = supply(&pool, 20).await;
        let view = submit(&pool, &staff, &create(supply_id, 2)).await.unwrap();

        let reject = RequestDecision {
            action: DecisionAction::Reject,
            reject_reason: Some("预算不足".into()),
        };
        let rejected = decide(&pool, &admin, view.id, &reject).await.unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);
        assert_eq!(rejected.reject_reason.as_deref(), Some("预算不足"));
        assert!(inbox(&pool, &staff).await[0].content.ends_with("原因：预算不足"));
    }

    #[tokio::test]
    async fn test_department_approver_limited_to_own_department() {
        let pool = testing::pool_with_roles().await;
        let baseline = crate::auth::RoleBaseline::builtin();
        let perms = baseline.permissions_for(ROLE_USER).unwrap().join(",") + ",approve_requests";
        role_repo::insert_if_missing(&pool, "team_lead", "部门主管", &perms, 3)
            .await
            .unwrap();
        let lead = testing::create_user(&pool, "lead", "人事部", "team_lead").await;
        let staff = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let supply_id = supply(&pool, 20).await;
        let view = submit(&pool, &staff, &create(supply_id, 2)).await.unwrap();

        let err = decide(&pool, &lead, view.id, &approve()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DepartmentMismatch);
        let current = request_repo::find_by_id(&pool, view.id).await.unwrap().unwrap();
        assert_eq!(current.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_super_admin_decides_only_own_department() {
        let pool = testing::pool_with_roles().await;
        let root = testing::create_user(&pool, "superadmin", "管理员", ROLE_SUPER_ADMIN).await;
        let staff = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let clerk = testing::create_user(&pool, "zhaoliu", "管理员", ROLE_USER).await;
        let supply_id = supply(&pool, 20).await;
        let tech = submit(&pool, &staff, &create(supply_id, 2)).await.unwrap();
        let own = submit(&pool, &clerk, &create(supply_id, 1)).await.unwrap();

        let visible: Vec<i64> = list(&pool, &root, None)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(visible, vec![own.id]);

        let err = decide(&pool, &root, tech.id, &approve()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DepartmentMismatch);
        let approved = decide(&pool, &root, own.id, &approve()).await.unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_issue_requires_approval_and_takes_stock() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_ADMIN).await;
        let staff = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let supply_id = supply(&pool, 10).await;
        let view = submit(&pool, &staff, &create(supply_id, 4)).await.unwrap();

        let err = issue(&pool, &admin, view.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RequestNotApproved);

        decide(&pool, &admin, view.id, &approve()).await.unwrap();
        let issued = issue(&pool, &admin, view.id).await.unwrap();
        assert_eq!(issued.status, RequestStatus::Issued);
        assert_eq!(issued.issuer_id, Some(admin.id));

        let stock = supply_repo::find_by_id(&pool, supply_id).await.unwrap().unwrap();
        assert_eq!(stock.current_stock, 6);
        assert_eq!(stock.total_stock, 10);

        let err = issue(&pool, &admin, view.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RequestNotApproved);
    }

    #[tokio::test]
    async fn test_issue_rolls_back_when_stock_ran_out() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_ADMIN).await;
        let staff = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let supply_id = supply(&pool, 5).await;
        let first = submit(&pool, &staff, &create(supply_id, 4)).await.unwrap();
        let second = submit(&pool, &staff, &create(supply_id, 4)).await.unwrap();
        decide(&pool, &admin, first.id, &approve()).await.unwrap();
        decide(&pool, &admin, second.id, &approve()).await.unwrap();

        issue(&pool, &admin, first.id).await.unwrap();
        let err = issue(&pool, &admin, second.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let stock = supply_repo::find_by_id(&pool, supply_id).await.unwrap().unwrap();
        assert_eq!(stock.current_stock, 1);
        let still = request_repo::find_by_id(&pool, second.id).await.unwrap().unwrap();
        assert_eq!(still.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_list_scopes() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_ADMIN).await;
        let zhang = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let li = testing::create_user(&pool, "lisi", "人事部", ROLE_USER).await;
        let supply_id = supply(&pool, 20).await;
        submit(&pool, &zhang, &create(supply_id, 1)).await.unwrap();
        submit(&pool, &li, &create(supply_id, 1)).await.unwrap();

        assert_eq!(list(&pool, &admin, None).await.unwrap().len(), 2);
        let own = list(&pool, &zhang, None).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].applicant_id, zhang.id);
        assert!(list(&pool, &li, Some(RequestStatus::Approved)).await.unwrap().is_empty());
    }
}
