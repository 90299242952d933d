//! JWT 认证与角色校验中间件
//!
//! 认证中间件验证请求中的 Bearer Token 并将用户信息注入请求扩展；
//! 角色中间件挂在各角色子路由上，统一拦截越权访问。

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::auth::{Claims, UserRole};
use crate::state::AppState;

/// 认证中间件
///
/// 从 Authorization header 中提取 Bearer Token，验证后将 Claims 注入
/// 请求扩展。对于公开路由（注册、登录、探针），跳过验证。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();

    // 公开路由列表（不需要认证）
    let public_paths = [
        "/api/auth/login",
        "/api/auth/register",
        "/api/auth/vendor-register",
        "/health",
        "/ready",
    ];

    if public_paths.iter().any(|p| path.starts_with(p)) {
        return next.run(request).await;
    }

    // 从 Authorization header 提取 Token
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("缺少认证 Token");
        }
    };

    match state.jwt_manager.verify_token(token) {
        Ok(claims) => {
            // 将 Claims 注入请求扩展，供后续处理器使用
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => unauthorized_response(&e.to_string()),
    }
}

/// 管理员角色校验中间件
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    require_role(request, next, UserRole::Admin).await
}

/// 学校角色校验中间件
pub async fn require_school(request: Request<Body>, next: Next) -> Response {
    require_role(request, next, UserRole::School).await
}

/// 商户角色校验中间件
pub async fn require_vendor(request: Request<Body>, next: Next) -> Response {
    require_role(request, next, UserRole::Vendor).await
}

/// 校验请求扩展中的 Claims 是否具备指定角色
async fn require_role(request: Request<Body>, next: Next, role: UserRole) -> Response {
    let authorized = request
        .extensions()
        .get::<Claims>()
        .map(|claims| claims.role == role);

    match authorized {
        Some(true) => next.run(request).await,
        Some(false) => forbidden_response(&format!("此操作需要 {} 角色", role.as_str())),
        None => unauthorized_response("缺少认证 Token"),
    }
}

/// 生成 401 未授权响应
fn unauthorized_response(message: &str) -> Response {
    let body = json!({
        "success": false,
        "code": "UNAUTHORIZED",
        "message": message,
        "data": null
    });

    (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
}

/// 生成 403 禁止访问响应
fn forbidden_response(message: &str) -> Response {
    let body = json!({
        "success": false,
        "code": "FORBIDDEN",
        "message": message,
        "data": null
    });

    (StatusCode::FORBIDDEN, axum::Json(body)).into_response()
}
