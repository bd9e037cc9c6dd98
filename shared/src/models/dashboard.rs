//! Dashboard Model (首页概览)

use serde::{Deserialize, Serialize};

use super::{NotificationView, SupplyRequestView};

/// Home page summary for the current user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    /// Latest visible notifications (top first)
    pub notifications: Vec<NotificationView>,
    /// Pending requests the user may decide on (0 without approve_requests)
    pub pending_approvals: i64,
    pub unread_messages: i64,
    /// Supplies at or below their threshold (0 without view_supplies)
    pub low_stock_count: i64,
    /// The user's own latest requests
    pub recent_requests: Vec<SupplyRequestView>,
}
