//! 站内消息的可见范围
//!
//! 列表: 收件人是本人，或通知类消息且目标部门为全公司/本部门。
//! 单条读取、标记已读、删除只认收件人；列表的通知类放宽只用于发现。

use shared::models::{Message, MessageFilter};
use sqlx::{QueryBuilder, Sqlite};

use super::push_department_visibility;
use crate::auth::CurrentUser;
use crate::auth::guard::{Decision, Requirement};

/// 列表排序: 未读在前，新消息在前
pub const LIST_ORDER: &str = " ORDER BY m.is_read ASC, m.created_at DESC, m.id DESC";

/// 只有收件人可以单条访问
pub fn can_access(user: &CurrentUser, message: &Message) -> bool {
    message.recipient_id == user.id
}

pub fn check_access(user: &CurrentUser, message: &Message) -> Decision {
    Decision::require(can_access(user, message), Requirement::Owner)
}

/// 列表范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageScope {
    pub user_id: i64,
    pub department: String,
}

impl MessageScope {
    pub fn for_user(user: &CurrentUser) -> Self {
        Self {
            user_id: user.id,
            department: user.department.clone(),
        }
    }

    /// 追加 ` AND (可见性) [AND 筛选]`，消息表别名固定为 `m`
    pub fn push_filter(&self, qb: &mut QueryBuilder<'_, Sqlite>, filter: MessageFilter) {
        qb.push(" AND (m.recipient_id = ")
            .push_bind(self.user_id)
            .push(" OR (m.category = 'notification' AND ");
        push_department_visibility(qb, "m.target_department", &self.department);
        qb.push("))");

        match filter {
            MessageFilter::All => {}
            MessageFilter::Personal => {
                qb.push(" AND m.category <> 'notification'");
            }
            MessageFilter::Notification => {
                qb.push(" AND m.category = 'notification'");
            }
            MessageFilter::Unread => {
                qb.push(" AND m.is_read = 0");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{MessageCategory, MessageType};

    fn message(recipient_id: i64, category: MessageCategory) -> Message {
        Message {
            id: 1,
            title: "t".into(),
            content: "c".into(),
            sender_id: 1,
            recipient_id,
            message_type: MessageType::System,
            category,
            target_department: None,
            is_read: false,
            related_url: None,
            created_at: 0,
        }
    }

    #[test]
    fn test_point_access_is_recipient_only() {
        let zhang = CurrentUser::new(3, "zhangsan", "技术部", &[]);
        assert!(can_access(&zhang, &message(3, MessageCategory::Personal)));
        // 通知类消息在列表中可见，但单条访问仍只认收件人
        assert!(!can_access(&zhang, &message(4, MessageCategory::Notification)));
        assert_eq!(
            check_access(&zhang, &message(4, MessageCategory::Personal))
                .into_result()
                .unwrap_err()
                .code,
            shared::error::ErrorCode::NotOwner
        );
    }

    #[test]
    fn test_filter_sql() {
        let scope = MessageScope {
            user_id: 3,
            department: "技术部".into(),
        };
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT m.id FROM messages m WHERE 1 = 1");
        scope.push_filter(&mut qb, MessageFilter::Unread);
        let sql = qb.sql();
        assert!(sql.contains("m.recipient_id = ?"));
        assert!(sql.contains("m.target_department IS NULL"));
        assert!(sql.ends_with(" AND m.is_read = 0"));
    }
}
