//! Employee API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    ArchiveOverview, Employee, EmployeeDetail, EmployeeFile, EmployeeFileInput, EmployeeInput,
    EmployeeQuery,
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::auth::permissions::{
    MANAGE_ARCHIVES, MANAGE_EMPLOYEES, VIEW_ARCHIVES, VIEW_EMPLOYEES,
};
use crate::core::ServerState;
use crate::db::repository::employee as employee_repo;

/// GET /api/employees?department=&keyword=
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<EmployeeQuery>,
) -> AppResult<Json<Vec<Employee>>> {
    user.require(VIEW_EMPLOYEES)?;
    Ok(Json(employee_repo::find_all(state.pool(), &query).await?))
}

/// GET /api/employees/{id} - 员工信息及档案文件
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<EmployeeDetail>> {
    user.require(VIEW_EMPLOYEES)?;
    let pool = state.pool();
    let employee = employee_repo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::EmployeeNotFound, format!("Employee {id} not found"))
    })?;
    let files = employee_repo::find_files(pool, id).await?;
    Ok(Json(EmployeeDetail { employee, files }))
}

/// POST /api/employees
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<EmployeeInput>,
) -> AppResult<Json<Employee>> {
    user.require(MANAGE_EMPLOYEES)?;
    payload.validate()?;
    let employee = employee_repo::create(state.pool(), &payload).await?;
    tracing::info!(
        id = employee.id,
        employee_id = %employee.employee_id,
        department = %employee.department,
        "Employee created"
    );
    Ok(Json(employee))
}

/// PUT /api/employees/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeInput>,
) -> AppResult<Json<Employee>> {
    user.require(MANAGE_EMPLOYEES)?;
    payload.validate()?;
    Ok(Json(employee_repo::update(state.pool(), id, &payload).await?))
}

/// POST /api/employees/{id}/files - 只记录元数据，不保存文件内容
pub async fn add_file(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeFileInput>,
) -> AppResult<Json<EmployeeFile>> {
    user.require(MANAGE_ARCHIVES)?;
    payload.validate()?;
    let file = employee_repo::add_file(state.pool(), id, user.id, &payload).await?;
    tracing::info!(employee_id = id, file_id = file.id, uploader_id = user.id, "Employee file recorded");
    Ok(Json(file))
}

/// GET /api/archives - 档案统计
pub async fn archives(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ArchiveOverview>> {
    user.require(VIEW_ARCHIVES)?;
    let pool = state.pool();
    Ok(Json(ArchiveOverview {
        stats: employee_repo::stats(pool).await?,
        employees: employee_repo::find_all(pool, &EmployeeQuery::default()).await?,
    }))
}
