//! 奖学金兑换凭证管理后台服务
//!
//! 提供注册审核、申请审批、兑换码提交与核验等 REST API。
//!
//! ## 核心功能
//!
//! - **注册审核**：学校/商户自助注册，管理员批准、拒绝或候补
//! - **申请审批**：奖学金申请与拨款申请的审批，批准时发放兑换码
//! - **兑换码核验**：商户提交兑换码，系统以服务身份跨表核验分类
//! - **凭证管理**：凭证列表、作废与两张持码表的一致性比对
//!
//! ## 模块结构
//!
//! - `auth`: JWT 与密码处理
//! - `middleware`: 认证与角色校验中间件
//! - `dto`: 请求和响应的数据传输对象
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `state`: 应用状态
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator
//! - 序列化：serde (camelCase)

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

// 重新导出核心类型
pub use dto::{ApiResponse, PageResponse, StatsOverview, UserDto, VerifyVoucherResponse};
pub use error::{AdminError, Result};
