//! Message Model (站内消息)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Message subtype
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum MessageType {
    #[default]
    System,
    Approval,
    Department,
    Reminder,
}

/// Message audience category
///
/// `Notification` messages are also discoverable by users of the target
/// department, not only by the recipient.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum MessageCategory {
    #[default]
    Personal,
    Notification,
}

/// Message entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Message {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub message_type: MessageType,
    pub category: MessageCategory,
    pub target_department: Option<String>,
    pub is_read: bool,
    pub related_url: Option<String>,
    pub created_at: i64,
}

/// Message joined with the sender's display name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MessageView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub sender_id: i64,
    pub sender_name: String,
    pub recipient_id: i64,
    pub message_type: MessageType,
    pub category: MessageCategory,
    pub target_department: Option<String>,
    pub is_read: bool,
    pub related_url: Option<String>,
    pub created_at: i64,
}

/// A message about to be inserted
///
/// The only way to build one is [`NewMessage::new`], which takes the sender.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    sender_id: i64,
    recipient_id: i64,
    title: String,
    content: String,
    message_type: MessageType,
    category: MessageCategory,
    target_department: Option<String>,
    related_url: Option<String>,
}

impl NewMessage {
    /// # Panics
    ///
    /// Panics when `sender_id` does not reference a persisted user (ids start at 1).
    pub fn new(
        sender_id: i64,
        recipient_id: i64,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        assert!(sender_id > 0, "message sender must be a persisted user");
        Self {
            sender_id,
            recipient_id,
            title: title.into(),
            content: content.into(),
            message_type: MessageType::System,
            category: MessageCategory::Personal,
            target_department: None,
            related_url: None,
        }
    }

    pub fn with_type(mut self, message_type: MessageType) -> Self {
        self.message_type = message_type;
        self
    }

    /// Mark as a notification-category message visible to `target_department`
    /// (`None` = company-wide)
    pub fn broadcast(mut self, target_department: Option<String>) -> Self {
        self.category = MessageCategory::Notification;
        self.target_department = target_department;
        self
    }

    pub fn with_related_url(mut self, url: impl Into<String>) -> Self {
        self.related_url = Some(url.into());
        self
    }

    pub fn sender_id(&self) -> i64 {
        self.sender_id
    }

    pub fn recipient_id(&self) -> i64 {
        self.recipient_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn category(&self) -> MessageCategory {
        self.category
    }

    pub fn target_department(&self) -> Option<&str> {
        self.target_department.as_deref()
    }

    pub fn related_url(&self) -> Option<&str> {
        self.related_url.as_deref()
    }
}

/// Send payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MessageSend {
    #[validate(length(min = 1, max = 100, message = "请输入消息标题"))]
    pub title: String,
    #[validate(length(min = 1, message = "请输入消息内容"))]
    pub content: String,
    pub recipient_id: i64,
    #[serde(default)]
    pub message_type: MessageType,
    #[serde(default)]
    pub category: MessageCategory,
    pub target_department: Option<String>,
}

/// Listing filter
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageFilter {
    #[default]
    All,
    Personal,
    Notification,
    Unread,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageQuery {
    #[serde(default)]
    pub filter: MessageFilter,
}

/// Listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageList {
    pub messages: Vec<MessageView>,
    /// Unread personal messages (recipient == current user)
    pub unread_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_defaults_to_personal_system() {
        let msg = NewMessage::new(1, 2, "标题", "内容");
        assert_eq!(msg.sender_id(), 1);
        assert_eq!(msg.recipient_id(), 2);
        assert_eq!(msg.category(), MessageCategory::Personal);
        assert_eq!(msg.message_type(), MessageType::System);
        assert!(msg.target_department().is_none());
    }

    #[test]
    fn test_broadcast_sets_category() {
        let msg = NewMessage::new(1, 1, "t", "c")
            .with_type(MessageType::Department)
            .broadcast(Some("技术部".into()))
            .with_related_url("/api/messages");
        assert_eq!(msg.category(), MessageCategory::Notification);
        assert_eq!(msg.target_department(), Some("技术部"));
        assert_eq!(msg.related_url(), Some("/api/messages"));
    }

    #[test]
    #[should_panic(expected = "message sender")]
    fn test_missing_sender_fails_fast() {
        let _ = NewMessage::new(0, 2, "t", "c");
    }

    #[test]
    fn test_filter_deserialize() {
        let q: MessageQuery = serde_json::from_str(r#"{"filter":"unread"}"#).unwrap();
        assert_eq!(q.filter, MessageFilter::Unread);
        let q: MessageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.filter, MessageFilter::All);
    }
}
