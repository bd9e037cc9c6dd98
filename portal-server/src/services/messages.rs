//! 站内消息

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    MessageCategory, MessageFilter, MessageList, MessageSend, MessageView, NewMessage,
};
use sqlx::SqlitePool;

use crate::auth::CurrentUser;
use crate::auth::guard;
use crate::auth::permissions::{PUBLISH_NOTICES, SEND_MESSAGES};
use crate::db::repository::{self, message as message_repo, user as user_repo};
use crate::scope::DepartmentScope;
use crate::scope::message::{MessageScope, check_access};

pub async fn list(
    pool: &SqlitePool,
    user: &CurrentUser,
    filter: MessageFilter,
) -> AppResult<MessageList> {
    let messages = message_repo::list(pool, &MessageScope::for_user(user), filter).await?;
    let unread_count = message_repo::count_unread(pool, user.id).await?;
    Ok(MessageList {
        messages,
        unread_count,
    })
}

pub async fn unread_count(pool: &SqlitePool, user: &CurrentUser) -> AppResult<i64> {
    Ok(message_repo::count_unread(pool, user.id).await?)
}

/// 收件人读取单条消息，顺带标记已读
pub async fn read(pool: &SqlitePool, user: &CurrentUser, id: i64) -> AppResult<MessageView> {
    mark_read(pool, user, id).await?;
    message_repo::find_view(pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// 幂等
pub async fn mark_read(pool: &SqlitePool, user: &CurrentUser, id: i64) -> AppResult<()> {
    let message = message_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    check_access(user, &message).into_result()?;
    if !message.is_read {
        message_repo::mark_read(pool, id).await?;
    }
    Ok(())
}

/// 发送消息；通知类 (广播) 额外需要发布通知的权限
pub async fn send(
    pool: &SqlitePool,
    sender: &CurrentUser,
    req: &MessageSend,
) -> AppResult<MessageView> {
    if req.category == MessageCategory::Notification {
        guard::check_all(Some(sender), &[SEND_MESSAGES, PUBLISH_NOTICES]).into_result()?;
    }
    if user_repo::find_by_id(pool, req.recipient_id).await?.is_none() {
        return Err(AppError::with_message(
            ErrorCode::RecipientNotFound,
            format!("收件人不存在: {}", req.recipient_id),
        ));
    }

    let mut msg = NewMessage::new(sender.id, req.recipient_id, req.title.trim(), req.content.as_str())
        .with_type(req.message_type);
    if req.category == MessageCategory::Notification {
        msg = msg.broadcast(DepartmentScope::from_input(req.target_department.clone()).to_stored());
    }

    let mut tx = repository::begin(pool).await?;
    let id = message_repo::insert(&mut tx, &msg).await?;
    repository::commit(tx).await?;

    tracing::info!(
        message_id = id,
        sender_id = sender.id,
        recipient_id = req.recipient_id,
        category = ?req.category,
        "Message sent"
    );
    message_repo::find_view(pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn delete(pool: &SqlitePool, user: &CurrentUser, id: i64) -> AppResult<()> {
    let message = message_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    check_access(user, &message).into_result()?;
    if !message_repo::delete(pool, id).await? {
        return Err(not_found(id));
    }
    Ok(())
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::MessageNotFound, format!("Message {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permissions::{ROLE_ADMIN, ROLE_USER};
    use crate::testing;
    use shared::models::MessageType;

    fn personal(recipient_id: i64) -> MessageSend {
        MessageSend {
            title: "会议提醒".into(),
            content: "下午三点开会".into(),
            recipient_id,
            message_type: MessageType::Reminder,
            category: MessageCategory::Personal,
            target_department: None,
        }
    }

    #[tokio::test]
    async fn test_only_recipient_reads_and_read_marks() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_ADMIN).await;
        let zhang = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let li = testing::create_user(&pool, "lisi", "技术部", ROLE_USER).await;

        let sent = send(&pool, &admin, &personal(zhang.id)).await.unwrap();
        assert_eq!(unread_count(&pool, &zhang).await.unwrap(), 1);

        let err = read(&pool, &li, sent.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotOwner);
        let err = delete(&pool, &li, sent.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotOwner);

        let view = read(&pool, &zhang, sent.id).await.unwrap();
        assert!(view.is_read);
        assert_eq!(view.sender_name, "admin");
        mark_read(&pool, &zhang, sent.id).await.unwrap();
        assert_eq!(unread_count(&pool, &zhang).await.unwrap(), 0);

        delete(&pool, &zhang, sent.id).await.unwrap();
        let err = read(&pool, &zhang, sent.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MessageNotFound);
    }

    #[tokio::test]
    async fn test_broadcast_requires_publish_permission() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_ADMIN).await;
        let zhang = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let li = testing::create_user(&pool, "lisi", "技术部", ROLE_USER).await;
        let carol = testing::create_user(&pool, "carol", "财务部", ROLE_USER).await;

        let mut broadcast = personal(zhang.id);
        broadcast.category = MessageCategory::Notification;
        broadcast.target_department = Some("技术部".into());

        let err = send(&pool, &zhang, &broadcast).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        send(&pool, &admin, &broadcast).await.unwrap();
        // 同部门可在列表中看到通知类消息，单条访问仍只认收件人
        let li_list = list(&pool, &li, MessageFilter::Notification).await.unwrap();
        assert_eq!(li_list.messages.len(), 1);
        assert_eq!(li_list.unread_count, 0);
        assert!(list(&pool, &carol, MessageFilter::All).await.unwrap().messages.is_empty());
    }

    #[tokio::test]
    async fn test_company_wide_broadcasts_listed_for_every_department() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_ADMIN).await;
        let zhang = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let carol = testing::create_user(&pool, "carol", "财务部", ROLE_USER).await;

        let mut tx = repository::begin(&pool).await.unwrap();
        for (title, department) in [
            ("系统升级", None),
            ("年会安排", Some("全公司")),
            ("代码评审", Some("技术部")),
        ] {
            let msg = NewMessage::new(admin.id, zhang.id, title, "内容")
                .broadcast(department.map(String::from));
            message_repo::insert(&mut tx, &msg).await.unwrap();
        }
        repository::commit(tx).await.unwrap();

        let mut titles: Vec<String> = list(&pool, &carol, MessageFilter::Notification)
            .await
            .unwrap()
            .messages
            .into_iter()
            .map(|m| m.title)
            .collect();
        titles.sort();
        let mut expected = vec!["系统升级".to_string(), "年会安排".to_string()];
        expected.sort();
        assert_eq!(titles, expected);
        assert_eq!(
            list(&pool, &zhang, MessageFilter::Notification).await.unwrap().messages.len(),
            3
        );
    }

    #[tokio::test]
    async fn test_unknown_recipient() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_ADMIN).await;
        let err = send(&pool, &admin, &personal(999)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RecipientNotFound);
    }
}
