//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射。角色校验以中间件形式挂在
//! 各角色子路由上，是唯一的横切授权点。

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{handlers, middleware::{require_admin, require_school, require_vendor}, state::AppState};

/// 构建认证相关的路由
///
/// 注册与登录为公开路由；me/refresh 需要认证（由全局认证中间件保证）
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register_school))
        .route(
            "/auth/vendor-register",
            post(handlers::auth::register_vendor),
        )
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::get_current_user))
        .route("/auth/refresh", post(handlers::auth::refresh_token))
}

/// 构建学校角色路由
///
/// 申请提交/查询、拨款申请、自己学校的凭证与注册状态
fn school_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/applications",
            post(handlers::application::submit_application),
        )
        .route(
            "/applications/mine",
            get(handlers::application::my_applications),
        )
        .route(
            "/voucher-requests",
            post(handlers::voucher_request::submit_voucher_request),
        )
        .route(
            "/voucher-requests/mine",
            get(handlers::voucher_request::my_voucher_requests),
        )
        .route("/vouchers/mine", get(handlers::voucher::my_vouchers))
        .route(
            "/school/signup-status",
            get(handlers::school_signup::my_signup_status),
        )
        .layer(middleware::from_fn(require_school))
}

/// 构建商户角色路由
///
/// 兑换码核验、提交与自己的提交记录
fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/vendor/verify", post(handlers::verify::verify_voucher))
        .route(
            "/vendor/submissions",
            post(handlers::submission::submit_voucher_code),
        )
        .route(
            "/vendor/submissions",
            get(handlers::submission::my_submissions),
        )
        .route(
            "/vendor/signup-status",
            get(handlers::vendor_signup::my_signup_status),
        )
        .layer(middleware::from_fn(require_vendor))
}

/// 构建管理员路由
///
/// 注册审核、申请审批、提交审批、凭证管理、统计与一致性比对
fn admin_routes() -> Router<AppState> {
    Router::new()
        // 学校注册审核
        .route(
            "/admin/school-signups",
            get(handlers::school_signup::list_school_signups),
        )
        .route(
            "/admin/school-signups/{id}/review",
            post(handlers::school_signup::review_school_signup),
        )
        // 商户注册审核
        .route(
            "/admin/vendor-signups",
            get(handlers::vendor_signup::list_vendor_signups),
        )
        .route(
            "/admin/vendor-signups/{id}/review",
            post(handlers::vendor_signup::review_vendor_signup),
        )
        // 奖学金申请审批
        .route(
            "/admin/applications",
            get(handlers::application::list_applications),
        )
        .route(
            "/admin/applications/{id}/review",
            post(handlers::application::review_application),
        )
        // 拨款申请审批
        .route(
            "/admin/voucher-requests",
            get(handlers::voucher_request::list_voucher_requests),
        )
        .route(
            "/admin/voucher-requests/{id}/review",
            post(handlers::voucher_request::review_voucher_request),
        )
        // 提交审批
        .route(
            "/admin/submissions",
            get(handlers::submission::list_submissions),
        )
        .route(
            "/admin/submissions/{id}/review",
            post(handlers::submission::review_submission),
        )
        // 凭证管理
        .route("/admin/vouchers", get(handlers::voucher::list_vouchers))
        .route(
            "/admin/vouchers/{id}/cancel",
            post(handlers::voucher::cancel_voucher),
        )
        // 统计与一致性
        .route("/admin/stats", get(handlers::stats::get_overview))
        .route(
            "/admin/consistency/voucher-codes",
            get(handlers::voucher::voucher_code_consistency),
        )
        .layer(middleware::from_fn(require_admin))
}

/// 构建完整的 API 路由
///
/// 返回全部 API 路由（不含前缀，由调用方在 main.rs 中挂载）
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(school_routes())
        .merge(vendor_routes())
        .merge(admin_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_construction() {
        let _auth = auth_routes();
        let _school = school_routes();
        let _vendor = vendor_routes();
        let _admin = admin_routes();
        let _api = api_routes();
    }
}
