//! 认证授权模块
//!
//! - [`JwtService`] - JWT 令牌服务 (令牌只携带用户 ID 与用户名)
//! - [`CurrentUser`] - 当前用户上下文，角色每次请求从数据库加载
//! - [`require_auth`] - 认证中间件
//! - [`permissions`] - 编译期权限目录
//! - [`role_store`] / [`RoleBaseline`] - 角色权限的持久化与基线
//! - [`authorization`] / [`guard`] - 权限判断与处理器守卫

pub mod authorization;
pub mod baseline;
pub mod current_user;
pub mod extractor;
pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod role_store;

pub use baseline::RoleBaseline;
pub use current_user::CurrentUser;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
