//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录、注册、当前用户
//! - [`dashboard`] - 首页概览
//! - [`notifications`] - 通知公告
//! - [`supplies`] - 耗材目录、库存维护、耗材分类
//! - [`requests`] - 耗材申请
//! - [`messages`] - 站内消息
//! - [`employees`] - 人员档案
//! - [`knowledge`] - 知识库
//! - [`users`] - 账户管理
//! - [`roles`] - 角色与权限

pub mod auth;
pub mod health;

pub mod dashboard;
pub mod employees;
pub mod knowledge;
pub mod messages;
pub mod notifications;
pub mod requests;
pub mod roles;
pub mod supplies;
pub mod users;
