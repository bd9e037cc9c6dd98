use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{JwtService, RoleBaseline};
use crate::core::{Config, Result};
use crate::db::DbService;
use crate::services::provisioning;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | 数据库连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | baseline | Arc<RoleBaseline> | 内置角色基线 (恢复默认权限) |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 角色基线
    pub baseline: Arc<RoleBaseline>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替
    pub fn new(
        config: Config,
        pool: SqlitePool,
        jwt_service: Arc<JwtService>,
        baseline: Arc<RoleBaseline>,
    ) -> Self {
        Self {
            config,
            pool,
            jwt_service,
            baseline,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录
    /// 2. 数据库 (迁移)
    /// 3. 内置角色、初始超级管理员、演示数据
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db = DbService::new(&config.database_path).await?;
        let baseline = Arc::new(RoleBaseline::builtin());

        provisioning::ensure_builtin_roles(&db.pool, &baseline).await?;
        if let Some(password) = &config.bootstrap_admin_password {
            provisioning::bootstrap_super_admin(
                &db.pool,
                &config.bootstrap_admin_username,
                password,
            )
            .await?;
        }
        if config.seed_demo {
            provisioning::seed_demo_data(&db.pool).await?;
        }

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self::new(config.clone(), db.pool, jwt_service, baseline))
    }

    /// 获取数据库连接池
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 获取角色基线
    pub fn baseline(&self) -> &RoleBaseline {
        &self.baseline
    }
}
