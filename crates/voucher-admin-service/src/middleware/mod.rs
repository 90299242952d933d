//! 中间件模块
//!
//! 认证与角色校验是唯一的横切授权点：JWT 中间件负责"调用者是谁"，
//! 角色中间件负责"能进哪组路由"，处理器内部不再做重定向式检查。

mod auth;

pub use auth::{auth_middleware, require_admin, require_school, require_vendor};
