//! 服务层 - 业务工作流
//!
//! # 服务列表
//!
//! - [`accounts`] - 登录、注册、账户审核与管理
//! - [`supply_requests`] - 耗材申请、审批、发放
//! - [`notifications`] - 通知公告
//! - [`messages`] - 站内消息
//! - [`knowledge`] - 知识库
//! - [`provisioning`] - 内置角色、初始超级管理员、演示数据
//! - [`http`] - HTTP 应用组装

pub mod accounts;
pub mod http;
pub mod knowledge;
pub mod messages;
pub mod notifications;
pub mod provisioning;
pub mod supply_requests;
