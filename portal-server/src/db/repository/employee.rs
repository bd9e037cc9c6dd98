//! Employee Repository (人员档案)

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{
    ArchiveStats, Employee, EmployeeFile, EmployeeFileInput, EmployeeInput, EmployeeQuery,
    STATUS_EMPLOYED,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COLUMNS: &str = "id, employee_id, name, department, position, email, phone, hire_date, status, created_at, updated_at";

/// 按部门、姓名排序；关键字匹配姓名、工号、职位
pub async fn find_all(pool: &SqlitePool, query: &EmployeeQuery) -> RepoResult<Vec<Employee>> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM employees WHERE 1 = 1"));
    if let Some(dept) = shared::util::non_blank(query.department.clone()) {
        qb.push(" AND department = ").push_bind(dept);
    }
    if let Some(keyword) = shared::util::non_blank(query.keyword.clone()) {
        let pattern = format!("%{keyword}%");
        qb.push(" AND (name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR employee_id LIKE ")
            .push_bind(pattern.clone())
            .push(" OR position LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    qb.push(" ORDER BY department, name");

    let rows = qb.build_query_as::<Employee>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Employee>> {
    let row = sqlx::query_as::<_, Employee>(&format!("SELECT {COLUMNS} FROM employees WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: &EmployeeInput) -> RepoResult<Employee> {
    let now = shared::util::now_millis();
    let status = data.status.as_deref().unwrap_or(STATUS_EMPLOYED);
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO employees (employee_id, name, department, position, email, phone, hire_date, status, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9) RETURNING id",
    )
    .bind(&data.employee_id)
    .bind(&data.name)
    .bind(&data.department)
    .bind(&data.position)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.hire_date)
    .bind(status)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| duplicate_employee_id(e, &data.employee_id))?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create employee".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &EmployeeInput) -> RepoResult<Employee> {
    let status = data.status.as_deref().unwrap_or(STATUS_EMPLOYED);
    let rows = sqlx::query(
        "UPDATE employees SET employee_id = ?, name = ?, department = ?, position = ?, email = ?, \
         phone = ?, hire_date = ?, status = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&data.employee_id)
    .bind(&data.name)
    .bind(&data.department)
    .bind(&data.position)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.hire_date)
    .bind(status)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| duplicate_employee_id(e, &data.employee_id))?;
    if rows.rows_affected() == 0 {
        return Err(employee_not_found(id));
    }
    find_by_id(pool, id).await?.ok_or_else(|| employee_not_found(id))
}

fn duplicate_employee_id(err: sqlx::Error, employee_id: &str) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::Business(
            ErrorCode::EmployeeIdExists,
            format!("工号 {employee_id} 已存在"),
        ),
        other => other,
    }
}

fn employee_not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::EmployeeNotFound, format!("Employee {id} not found"))
}

// ── Files ───────────────────────────────────────────────────

pub async fn find_files(pool: &SqlitePool, employee_id: i64) -> RepoResult<Vec<EmployeeFile>> {
    let rows = sqlx::query_as::<_, EmployeeFile>(
        "SELECT id, employee_id, file_name, file_type, file_path, uploader_id, upload_time, description \
         FROM employee_files WHERE employee_id = ? ORDER BY upload_time DESC, id DESC",
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn add_file(
    pool: &SqlitePool,
    employee_id: i64,
    uploader_id: i64,
    data: &EmployeeFileInput,
) -> RepoResult<EmployeeFile> {
    if find_by_id(pool, employee_id).await?.is_none() {
        return Err(employee_not_found(employee_id));
    }
    let file = sqlx::query_as::<_, EmployeeFile>(
        "INSERT INTO employee_files (employee_id, file_name, file_type, file_path, uploader_id, upload_time, description) \
         VALUES (?, ?, ?, ?, ?, ?, ?) \
         RETURNING id, employee_id, file_name, file_type, file_path, uploader_id, upload_time, description",
    )
    .bind(employee_id)
    .bind(&data.file_name)
    .bind(&data.file_type)
    .bind(&data.file_path)
    .bind(uploader_id)
    .bind(shared::util::now_millis())
    .bind(&data.description)
    .fetch_one(pool)
    .await?;
    Ok(file)
}

// ── Archive statistics ──────────────────────────────────────

pub async fn stats(pool: &SqlitePool) -> RepoResult<ArchiveStats> {
    let (total_employees, active_employees, departments): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status = ? THEN 1 ELSE 0 END), 0), \
         COUNT(DISTINCT department) FROM employees",
    )
    .bind(STATUS_EMPLOYED)
    .fetch_one(pool)
    .await?;
    Ok(ArchiveStats {
        total_employees,
        active_employees,
        departments,
    })
}
