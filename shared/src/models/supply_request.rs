//! Supply Request Model (耗材申请)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request lifecycle: `pending → {approved | rejected}`, `approved → issued`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Issued,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Issued => "issued",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supply request entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SupplyRequest {
    pub id: i64,
    pub applicant_id: i64,
    pub supply_id: i64,
    pub quantity: i64,
    pub status: RequestStatus,
    pub apply_time: i64,
    pub approver_id: Option<i64>,
    pub approve_time: Option<i64>,
    pub reject_reason: Option<String>,
    pub issuer_id: Option<i64>,
    pub issue_time: Option<i64>,
}

/// Request joined with applicant and supply details
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SupplyRequestView {
    pub id: i64,
    pub applicant_id: i64,
    pub applicant_name: String,
    pub applicant_department: String,
    pub supply_id: i64,
    pub supply_name: String,
    pub unit: String,
    pub quantity: i64,
    pub status: RequestStatus,
    pub apply_time: i64,
    pub approver_id: Option<i64>,
    pub approve_time: Option<i64>,
    pub reject_reason: Option<String>,
    pub issuer_id: Option<i64>,
    pub issue_time: Option<i64>,
}

/// Submit payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SupplyRequestCreate {
    pub supply_id: i64,
    #[validate(range(min = 1, message = "数量必须大于0"))]
    pub quantity: i64,
}

/// Listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestQuery {
    pub status: Option<RequestStatus>,
}

/// Approver's choice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Approve,
    Reject,
}

/// Approve / reject payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDecision {
    pub action: DecisionAction,
    pub reject_reason: Option<String>,
}
