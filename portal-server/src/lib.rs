//! Office Portal Server - 企业内部办公门户
//!
//! # 架构概述
//!
//! - **认证** (`auth`): JWT + Argon2，角色权限集 (RBAC) 与授权判定
//! - **范围** (`scope`): 部门可见性、申请审批范围、消息访问
//! - **数据库** (`db`): SQLite (sqlx)，迁移与仓储函数
//! - **服务** (`services`): 账户审核、耗材申请、通知、消息、知识库工作流
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! portal-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # JWT、权限目录、角色基线、授权
//! ├── scope/         # 数据范围
//! ├── services/      # 业务工作流、HTTP 组装、初始化数据
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 日志
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod scope;
pub mod services;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService, RoleBaseline};
pub use core::{Config, Server, ServerState};
pub use services::http::build_app;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 登录、审核、权限变更等安全事件
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 加载 `.env` 并按环境变量初始化日志
///
/// 日志配置在 [`Config`] 之前读取，配置错误本身也能被记录。
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let log_json = std::env::var("LOG_JSON")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty());
    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)?;
    }

    init_logger_with_file(Some(&log_level), log_json, log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____             __        __
   / __ \____  _____/ /_____ _/ /
  / /_/ / __ \/ ___/ __/ __ `/ /
 / ____/ /_/ / /  / /_/ /_/ / /
/_/    \____/_/   \__/\__,_/_/
        Office Portal v{}
    "#,
        env!("CARGO_PKG_VERSION")
    );
}
