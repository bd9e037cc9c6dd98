//! 通知公告工作流

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{NewMessage, NotificationInput, NotificationView};
use sqlx::SqlitePool;

use crate::auth::CurrentUser;
use crate::db::repository::{
    self, RepoError, message as message_repo, notification as notification_repo,
};
use crate::db::repository::notification::NotificationWrite;
use crate::scope::DepartmentScope;
use crate::scope::notification::{NotificationScope, check_delete, check_edit, check_view};

fn normalize(input: &NotificationInput) -> NotificationWrite {
    NotificationWrite {
        title: input.title.trim().to_string(),
        content: input.content.clone(),
        department: DepartmentScope::from_input(input.department.clone()).to_stored(),
        is_top: input.is_top,
    }
}

pub async fn list(
    pool: &SqlitePool,
    user: &CurrentUser,
    limit: Option<i64>,
) -> AppResult<Vec<NotificationView>> {
    let scope = NotificationScope::for_user(user);
    Ok(notification_repo::list(pool, &scope, limit).await?)
}

pub async fn detail(pool: &SqlitePool, user: &CurrentUser, id: i64) -> AppResult<NotificationView> {
    let notification = notification_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    check_view(user, &notification).into_result()?;
    notification_repo::find_view(pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// 发布通知，并给发布者发一条回执
pub async fn publish(
    pool: &SqlitePool,
    publisher: &CurrentUser,
    input: &NotificationInput,
) -> AppResult<NotificationView> {
    let data = normalize(input);

    let mut tx = repository::begin(pool).await?;
    let id = notification_repo::create(&mut tx, publisher.id, &data).await?;
    let receipt = NewMessage::new(
        publisher.id,
        publisher.id,
        format!("通知发布成功: {}", data.title),
        format!("您已成功发布通知：{}。该通知将显示给相关用户。", data.title),
    )
    .with_related_url(format!("/api/notifications/{id}"));
    message_repo::insert(&mut tx, &receipt).await?;
    repository::commit(tx).await?;

    tracing::info!(
        notification_id = id,
        publisher_id = publisher.id,
        department = data.department.as_deref().unwrap_or("*"),
        "Notification published"
    );
    notification_repo::find_view(pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn update(
    pool: &SqlitePool,
    user: &CurrentUser,
    id: i64,
    input: &NotificationInput,
) -> AppResult<NotificationView> {
    let notification = notification_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    check_edit(user, &notification).into_result()?;

    notification_repo::update(pool, id, &normalize(input))
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => not_found(id),
            other => other.into(),
        })?;
    tracing::info!(notification_id = id, user_id = user.id, "Notification updated");
    notification_repo::find_view(pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn delete(pool: &SqlitePool, user: &CurrentUser, id: i64) -> AppResult<()> {
    let notification = notification_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    check_delete(user, &notification).into_result()?;

    if !notification_repo::delete(pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(notification_id = id, user_id = user.id, "Notification deleted");
    Ok(())
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::NotificationNotFound,
        format!("Notification {id} not found"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permissions::{ROLE_ADMIN, ROLE_USER};
    use crate::scope::message::MessageScope;
    use crate::testing;
    use shared::models::MessageFilter;

    fn input(title: &str, department: Option<&str>) -> NotificationInput {
        NotificationInput {
            title: title.into(),
            content: "下周一全员大会".into(),
            department: department.map(String::from),
            is_top: false,
        }
    }

    #[tokio::test]
    async fn test_publish_normalizes_department_and_sends_receipt() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_ADMIN).await;

        let view = publish(&pool, &admin, &input("全员大会", Some("全公司")))
            .await
            .unwrap();
        assert_eq!(view.department, None);
        assert_eq!(view.publisher_name, "admin");

        let inbox = message_repo::list(&pool, &MessageScope::for_user(&admin), MessageFilter::All)
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].title, "通知发布成功: 全员大会");
        assert_eq!(inbox[0].recipient_id, admin.id);
    }

    #[tokio::test]
    async fn test_other_department_cannot_view_detail() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_ADMIN).await;
        let carol = testing::create_user(&pool, "carol", "财务部", ROLE_USER).await;
        let tech = publish(&pool, &admin, &input("技术部例会", Some("技术部")))
            .await
            .unwrap();

        let err = detail(&pool, &carol, tech.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DepartmentMismatch);
        assert!(list(&pool, &carol, None).await.unwrap().is_empty());
        assert_eq!(list(&pool, &admin, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_company_wide_rows_listed_for_every_department() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_ADMIN).await;
        let carol = testing::create_user(&pool, "carol", "财务部", ROLE_USER).await;

        // 旧数据可能直接存 "全公司"，绕过写入时的归一化
        let mut tx = repository::begin(&pool).await.unwrap();
        for (title, department) in [
            ("全员大会", None),
            ("年会通知", Some("全公司")),
            ("技术部例会", Some("技术部")),
        ] {
            let data = NotificationWrite {
                title: title.into(),
                content: "内容".into(),
                department: department.map(String::from),
                is_top: false,
            };
            notification_repo::create(&mut tx, admin.id, &data).await.unwrap();
        }
        repository::commit(tx).await.unwrap();

        let mut titles: Vec<String> = list(&pool, &carol, None)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        titles.sort();
        let mut expected = vec!["全员大会".to_string(), "年会通知".to_string()];
        expected.sort();
        assert_eq!(titles, expected);
        assert_eq!(list(&pool, &admin, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_only_publisher_or_admin_edits() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_ADMIN).await;
        let zhang = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let notice = publish(&pool, &admin, &input("技术部例会", Some("技术部")))
            .await
            .unwrap();

        // 同部门可见但不可编辑
        assert!(detail(&pool, &zhang, notice.id).await.is_ok());
        let err = update(&pool, &zhang, notice.id, &input("改", None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotOwner);
        let err = delete(&pool, &zhang, notice.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotOwner);

        let edited = update(&pool, &admin, notice.id, &input("技术部周会", Some("")))
            .await
            .unwrap();
        assert_eq!(edited.title, "技术部周会");
        assert_eq!(edited.department, None);

        delete(&pool, &admin, notice.id).await.unwrap();
        let err = detail(&pool, &admin, notice.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotificationNotFound);
    }
}
