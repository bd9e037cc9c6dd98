//! Supply Request Repository
//!
//! 状态转换全部是带前置状态的条件更新 (`WHERE status = ?`)，
//! 返回是否命中，由调用方决定 409 还是回滚。

use super::RepoResult;
use crate::scope::supply_request::RequestScope;
use shared::models::{RequestStatus, SupplyRequest, SupplyRequestView};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, applicant_id, supply_id, quantity, status, apply_time, approver_id, approve_time, reject_reason, issuer_id, issue_time";

const VIEW_SELECT: &str = "SELECT r.id, r.applicant_id, COALESCE(a.real_name, a.username) AS applicant_name, \
     a.department AS applicant_department, r.supply_id, s.name AS supply_name, s.unit, r.quantity, r.status, \
     r.apply_time, r.approver_id, r.approve_time, r.reject_reason, r.issuer_id, r.issue_time \
     FROM supply_requests r JOIN users a ON a.id = r.applicant_id JOIN supplies s ON s.id = r.supply_id";

pub async fn find_by_id(
    db: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<SupplyRequest>> {
    let row = sqlx::query_as::<_, SupplyRequest>(&format!(
        "SELECT {COLUMNS} FROM supply_requests WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn find_view(
    db: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<SupplyRequestView>> {
    let row = sqlx::query_as::<_, SupplyRequestView>(&format!("{VIEW_SELECT} WHERE r.id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// 按范围列出申请，申请时间倒序
pub async fn list(
    pool: &SqlitePool,
    scope: &RequestScope,
    status: Option<RequestStatus>,
    limit: Option<i64>,
) -> RepoResult<Vec<SupplyRequestView>> {
    let mut qb = QueryBuilder::<Sqlite>::new(VIEW_SELECT);
    qb.push(" WHERE 1 = 1");
    scope.push_filter(&mut qb, "r", "a");
    if let Some(status) = status {
        qb.push(" AND r.status = ").push_bind(status);
    }
    qb.push(" ORDER BY r.apply_time DESC, r.id DESC");
    if let Some(limit) = limit {
        qb.push(" LIMIT ").push_bind(limit);
    }

    let rows = qb
        .build_query_as::<SupplyRequestView>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// 范围内待审批的数量
pub async fn count_pending(pool: &SqlitePool, scope: &RequestScope) -> RepoResult<i64> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT COUNT(*) FROM supply_requests r JOIN users a ON a.id = r.applicant_id \
         WHERE r.status = 'pending'",
    );
    scope.push_filter(&mut qb, "r", "a");
    let count: i64 = qb.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(count)
}

pub async fn create(
    conn: &mut SqliteConnection,
    applicant_id: i64,
    supply_id: i64,
    quantity: i64,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO supply_requests (applicant_id, supply_id, quantity, status, apply_time) \
         VALUES (?, ?, ?, 'pending', ?) RETURNING id",
    )
    .bind(applicant_id)
    .bind(supply_id)
    .bind(quantity)
    .bind(shared::util::now_millis())
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// pending → approved / rejected
pub async fn decide(
    conn: &mut SqliteConnection,
    id: i64,
    approver_id: i64,
    to: RequestStatus,
    reject_reason: Option<&str>,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE supply_requests SET status = ?, approver_id = ?, approve_time = ?, reject_reason = ? \
         WHERE id = ? AND status = 'pending'",
    )
    .bind(to)
    .bind(approver_id)
    .bind(shared::util::now_millis())
    .bind(reject_reason)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// approved → issued
pub async fn mark_issued(
    conn: &mut SqliteConnection,
    id: i64,
    issuer_id: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE supply_requests SET status = 'issued', issuer_id = ?, issue_time = ? \
         WHERE id = ? AND status = 'approved'",
    )
    .bind(issuer_id)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}
