//! 启动预置
//!
//! - 内置角色: 缺失的按基线补齐，已有角色保持不变
//! - 初始超级管理员: 空库且配置了密码时创建
//! - 演示数据: `PORTAL_SEED_DEMO=true` 时写入，已有 `admin` 账户则跳过

use anyhow::Context;
use shared::models::{
    EmployeeInput, KnowledgeArticleInput, KnowledgeCategoryInput, MessageType, NewMessage,
    SupplyCategoryInput, SupplyInput, UserStatus,
};
use sqlx::{SqliteConnection, SqlitePool};

use crate::auth::permissions::{ROLE_ADMIN, ROLE_PENDING, ROLE_SUPER_ADMIN, ROLE_USER};
use crate::auth::{RoleBaseline, password, role_store};
use crate::db::repository::{
    employee as employee_repo, knowledge as knowledge_repo, message as message_repo,
    notification as notification_repo, role as role_repo, supply as supply_repo,
    user as user_repo,
};
use crate::scope::DepartmentScope;

/// 补齐缺失的内置角色，返回新增数量
pub async fn ensure_builtin_roles(
    pool: &SqlitePool,
    baseline: &RoleBaseline,
) -> anyhow::Result<usize> {
    let mut inserted = 0;
    for role in baseline.roles() {
        let added = role_repo::insert_if_missing(
            pool,
            &role.name,
            &role.description,
            &role_store::serialize(&role.permissions),
            role.level,
        )
        .await
        .with_context(|| format!("failed to provision role {}", role.name))?;
        if added {
            inserted += 1;
        }
    }

    if inserted > 0 {
        tracing::info!(
            inserted,
            baseline_version = baseline.version(),
            "Built-in roles provisioned"
        );
    }
    Ok(inserted)
}

/// 空库时创建初始超级管理员，返回是否创建
pub async fn bootstrap_super_admin(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> anyhow::Result<bool> {
    if user_repo::count(pool).await? > 0 {
        return Ok(false);
    }

    let hash = password::hash_password(password)?;
    let mut tx = pool.begin().await?;
    let id = user_repo::create(
        &mut tx,
        &user_repo::NewUser {
            username: username.to_string(),
            password_hash: hash,
            real_name: Some("超级管理员".into()),
            email: None,
            phone: None,
            department: "管理员".into(),
            status: UserStatus::Active,
        },
    )
    .await?;
    role_repo::assign_by_name(&mut tx, id, ROLE_SUPER_ADMIN).await?;
    tx.commit().await?;

    crate::security_log!("INFO", "bootstrap_super_admin", user_id = id, username = username);
    Ok(true)
}

struct DemoAccount {
    username: &'static str,
    real_name: &'static str,
    department: &'static str,
    role: &'static str,
    status: UserStatus,
}

const DEMO_ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        username: "superadmin",
        real_name: "超级管理员",
        department: "管理员",
        role: ROLE_SUPER_ADMIN,
        status: UserStatus::Active,
    },
    DemoAccount {
        username: "admin",
        real_name: "系统管理员",
        department: "管理员",
        role: ROLE_ADMIN,
        status: UserStatus::Active,
    },
    DemoAccount {
        username: "zhangsan",
        real_name: "张三",
        department: "技术部",
        role: ROLE_USER,
        status: UserStatus::Active,
    },
    DemoAccount {
        username: "lisi",
        real_name: "李四",
        department: "人事部",
        role: ROLE_USER,
        status: UserStatus::Active,
    },
    DemoAccount {
        username: "wangwu",
        real_name: "王五",
        department: "财务部",
        role: ROLE_PENDING,
        status: UserStatus::Pending,
    },
];

const DEMO_PASSWORD: &str = "admin123";
const DEMO_PENDING_PASSWORD: &str = "password123";

/// 写入演示数据，返回是否写入
pub async fn seed_demo_data(pool: &SqlitePool) -> anyhow::Result<bool> {
    if user_repo::find_by_username(pool, "admin").await?.is_some() {
        tracing::info!("Demo data already present, skipping seed");
        return Ok(false);
    }

    let active_hash = password::hash_password(DEMO_PASSWORD)?;
    let pending_hash = password::hash_password(DEMO_PENDING_PASSWORD)?;

    // 账户、通知、消息在一个事务里
    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(DEMO_ACCOUNTS.len());
    for account in DEMO_ACCOUNTS {
        let hash = match account.status {
            UserStatus::Pending => &pending_hash,
            _ => &active_hash,
        };
        ids.push(seed_account(&mut tx, account, hash).await?);
    }
    let (super_admin, admin, zhangsan) = (ids[0], ids[1], ids[2]);
    seed_notifications(&mut tx, super_admin, admin, zhangsan).await?;
    seed_messages(&mut tx, super_admin, admin, zhangsan).await?;
    tx.commit().await?;

    seed_supplies(pool).await?;
    seed_employees(pool).await?;
    seed_knowledge(pool, admin).await?;

    tracing::info!(accounts = ids.len(), "Demo data seeded");
    Ok(true)
}

/// 已存在 (如初始超级管理员) 时复用
async fn seed_account(
    conn: &mut SqliteConnection,
    account: &DemoAccount,
    password_hash: &str,
) -> anyhow::Result<i64> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
        .bind(account.username)
        .fetch_optional(&mut *conn)
        .await?;
    if let Some(id) = existing {
        return Ok(id);
    }

    let id = user_repo::create(
        conn,
        &user_repo::NewUser {
            username: account.username.into(),
            password_hash: password_hash.into(),
            real_name: Some(account.real_name.into()),
            email: Some(format!("{}@company.com", account.username)),
            phone: None,
            department: account.department.into(),
            status: account.status,
        },
    )
    .await?;
    role_repo::assign_by_name(conn, id, account.role).await?;
    Ok(id)
}

async fn seed_notifications(
    conn: &mut SqliteConnection,
    super_admin: i64,
    admin: i64,
    zhangsan: i64,
) -> anyhow::Result<()> {
    let notices = [
        (
            super_admin,
            "春节放假通知",
            "公司将于2月10日至2月17日放假，共8天。请大家安排好工作。",
            DepartmentScope::CompanyWide,
            true,
        ),
        (
            admin,
            "新员工入职培训",
            "本周五下午2点将在会议室A举行新员工入职培训，请相关人员准时参加。",
            DepartmentScope::CompanyWide,
            false,
        ),
        (
            zhangsan,
            "服务器维护通知",
            "本周六凌晨2点至4点进行服务器维护，期间系统将无法访问。",
            DepartmentScope::Department("技术部".into()),
            false,
        ),
    ];

    for (publisher, title, content, scope, is_top) in notices {
        notification_repo::create(
            conn,
            publisher,
            &notification_repo::NotificationWrite {
                title: title.into(),
                content: content.into(),
                department: scope.to_stored(),
                is_top,
            },
        )
        .await?;
    }
    Ok(())
}

async fn seed_messages(
    conn: &mut SqliteConnection,
    super_admin: i64,
    admin: i64,
    zhangsan: i64,
) -> anyhow::Result<()> {
    let messages = [
        NewMessage::new(
            super_admin,
            zhangsan,
            "欢迎使用消息系统",
            "欢迎使用公司内部消息系统！您可以通过此系统接收审批通知、部门消息等重要信息。",
        ),
        NewMessage::new(
            admin,
            zhangsan,
            "耗材申请已批准",
            "您的签字笔申请（数量：5支）已被管理员批准，请前往耗材管理处领取。",
        )
        .with_type(MessageType::Approval)
        .with_related_url("/api/requests"),
        NewMessage::new(
            admin,
            zhangsan,
            "部门会议通知",
            "本周五下午3点将在会议室B召开技术部部门会议，请准时参加。",
        )
        .with_type(MessageType::Department),
    ];

    for msg in &messages {
        message_repo::insert(conn, msg).await?;
    }
    Ok(())
}

async fn seed_supplies(pool: &SqlitePool) -> anyhow::Result<()> {
    let categories = [
        ("办公文具", "笔、纸、文件夹等办公用品"),
        ("IT设备", "电脑配件、耗材等"),
        ("生活用品", "纸巾、饮用水等"),
    ];
    let mut category_ids = Vec::with_capacity(categories.len());
    for (name, description) in categories {
        let category = supply_repo::create_category(
            pool,
            &SupplyCategoryInput {
                name: name.into(),
                description: Some(description.into()),
            },
        )
        .await?;
        category_ids.push(category.id);
    }

    // (name, category index, total, current, unit, threshold)
    let supplies = [
        ("签字笔", 0, 100, 95, "支", 20),
        ("A4打印纸", 0, 50, 50, "包", 10),
        ("USB闪存盘", 1, 20, 18, "个", 5),
        ("瓶装水", 2, 200, 150, "瓶", 50),
    ];
    for (name, category, total, current, unit, threshold) in supplies {
        supply_repo::create(
            pool,
            &SupplyInput {
                name: name.into(),
                category_id: Some(category_ids[category]),
                total_stock: total,
                current_stock: current,
                unit: unit.into(),
                min_stock_threshold: threshold,
                description: None,
            },
        )
        .await?;
    }
    Ok(())
}

async fn seed_employees(pool: &SqlitePool) -> anyhow::Result<()> {
    let employees = [
        ("EMP001", "张三", "技术部", "高级工程师", "zhangsan@company.com", "13800138001", "2020-05-10"),
        ("EMP002", "李四", "人事部", "人事经理", "lisi@company.com", "13800138002", "2019-03-15"),
    ];
    for (employee_id, name, department, position, email, phone, hire_date) in employees {
        employee_repo::create(
            pool,
            &EmployeeInput {
                employee_id: employee_id.into(),
                name: name.into(),
                department: department.into(),
                position: position.into(),
                email: Some(email.into()),
                phone: Some(phone.into()),
                hire_date: hire_date.into(),
                status: None,
            },
        )
        .await?;
    }
    Ok(())
}

async fn seed_knowledge(pool: &SqlitePool, author_id: i64) -> anyhow::Result<()> {
    let categories = [
        ("公司制度", "公司各项规章制度"),
        ("工作流程", "各部门工作流程规范"),
        ("技术文档", "技术开发相关文档"),
        ("培训资料", "员工培训学习资料"),
    ];
    let mut category_ids = Vec::with_capacity(categories.len());
    for (name, description) in categories {
        let category = knowledge_repo::create_category(
            pool,
            &KnowledgeCategoryInput {
                name: name.into(),
                description: Some(description.into()),
                parent_id: None,
            },
        )
        .await?;
        category_ids.push(category.id);
    }

    let articles = [
        (
            "新员工入职指南",
            "欢迎新同事加入！本文档将指导您完成入职流程：\n\n1. 办理入职手续\n2. 领取办公用品\n3. 参加入职培训\n4. 熟悉工作环境\n\n如有任何问题，请随时联系人事部。",
            0,
            "入职,指南,新员工",
        ),
        (
            "财务报销流程",
            "公司财务报销的具体流程和注意事项：\n\n1. 填写报销单\n2. 部门经理审批\n3. 财务部审核\n4. 出纳付款\n\n请注意保留所有原始票据。",
            1,
            "财务,报销,流程",
        ),
    ];
    for (title, content, category, tags) in articles {
        knowledge_repo::create_article(
            pool,
            author_id,
            &KnowledgeArticleInput {
                title: title.into(),
                content: content.into(),
                category_id: Some(category_ids[category]),
                tags: Some(tags.into()),
                is_published: true,
            },
        )
        .await?;
    }
    Ok(())
}
