//! 认证相关的 HTTP 处理器
//!
//! 提供学校/商户注册、登录、获取当前用户和刷新 Token 的 API。
//! 身份数据存放在 user_profiles 表，业务层只消费账号 ID 和角色。

use axum::{Extension, Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use voucher_management::models::{NewSchoolSignup, NewVendorSignup};

use crate::auth::{Claims, UserRole, hash_password, verify_password};
use crate::dto::{ApiResponse, UserDto};
use crate::error::{AdminError, Result};
use crate::state::AppState;

/// 连续登录失败锁定阈值
const MAX_FAILED_LOGINS: i32 = 5;

/// 锁定时长（分钟）
const LOCK_MINUTES: i64 = 30;

// ============================================
// 请求/响应 DTO
// ============================================

/// 学校注册请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSchoolRequest {
    #[validate(email(message = "邮箱格式不合法"))]
    pub email: String,
    #[validate(length(min = 8, max = 100, message = "密码长度必须在 8-100 之间"))]
    pub password: String,
    #[validate(length(min = 1, max = 200, message = "学校名称长度必须在 1-200 之间"))]
    pub school_name: String,
    #[validate(length(min = 1, max = 100, message = "联系人长度必须在 1-100 之间"))]
    pub contact_name: String,
    pub contact_phone: Option<String>,
    pub school_address: Option<String>,
    pub school_district: Option<String>,
    pub school_type: Option<String>,
    #[validate(range(min = 1, message = "学生人数必须为正数"))]
    pub student_count: Option<i32>,
    pub website: Option<String>,
    pub additional_info: Option<String>,
}

/// 商户注册请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVendorRequest {
    #[validate(email(message = "邮箱格式不合法"))]
    pub email: String,
    #[validate(length(min = 8, max = 100, message = "密码长度必须在 8-100 之间"))]
    pub password: String,
    #[validate(length(min = 1, max = 200, message = "商户名称长度必须在 1-200 之间"))]
    pub vendor_name: String,
    #[validate(length(min = 1, max = 100, message = "商户类型长度必须在 1-100 之间"))]
    pub vendor_type: String,
    #[validate(length(min = 2, max = 100, message = "国家长度必须在 2-100 之间"))]
    pub country: String,
    #[validate(length(min = 1, max = 100, message = "联系人长度必须在 1-100 之间"))]
    pub contact_name: String,
    pub contact_phone: Option<String>,
}

/// 注册响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub signup_id: i64,
    pub signup_status: String,
}

/// 登录请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "邮箱格式不合法"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "密码不能为空"))]
    pub password: String,
}

/// 登录响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
    pub expires_at: i64,
}

/// Token 刷新响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub token: String,
    pub expires_at: i64,
}

// ============================================
// 数据库模型
// ============================================

/// 账号记录
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    display_name: Option<String>,
    role: UserRole,
    status: String,
    failed_login_attempts: i32,
    locked_until: Option<DateTime<Utc>>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_dto(self) -> UserDto {
        UserDto {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            role: self.role,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
        }
    }
}

/// 创建账号记录，邮箱冲突时返回业务错误
async fn insert_user(
    state: &AppState,
    email: &str,
    password: &str,
    display_name: &str,
    role: UserRole,
) -> Result<Uuid> {
    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM user_profiles WHERE email = $1")
        .bind(email)
        .fetch_optional(&state.pool)
        .await?;
    if existing.is_some() {
        return Err(AdminError::EmailAlreadyRegistered(email.to_string()));
    }

    let password_hash = hash_password(password)?;

    let user_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO user_profiles (email, password_hash, display_name, role, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 'active', NOW(), NOW())
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(&password_hash)
    .bind(display_name)
    .bind(role)
    .fetch_one(&state.pool)
    .await?;

    Ok(user_id)
}

// ============================================
// API 处理器
// ============================================

/// 学校注册
///
/// POST /api/auth/register
///
/// 创建学校账号并登记注册审核记录；账号在注册记录批准前即可登录，
/// 但业务数据接口按注册状态由前端引导。
pub async fn register_school(
    State(state): State<AppState>,
    Json(req): Json<RegisterSchoolRequest>,
) -> Result<Json<ApiResponse<RegisterResponse>>> {
    req.validate()?;

    let user_id = insert_user(
        &state,
        &req.email,
        &req.password,
        &req.school_name,
        UserRole::School,
    )
    .await?;

    let signup = state
        .signups
        .register_school(NewSchoolSignup {
            user_id,
            email: req.email.clone(),
            school_name: req.school_name,
            contact_name: req.contact_name,
            contact_phone: req.contact_phone,
            school_address: req.school_address,
            school_district: req.school_district,
            school_type: req.school_type,
            student_count: req.student_count,
            website: req.website,
            additional_info: req.additional_info,
        })
        .await?;

    info!(user_id = %user_id, signup_id = signup.id, "学校账号注册完成");

    Ok(Json(ApiResponse::success_with_message(
        RegisterResponse {
            user_id,
            signup_id: signup.id,
            signup_status: signup.status.as_str().to_string(),
        },
        "注册成功，等待管理员审核",
    )))
}

/// 商户注册
///
/// POST /api/auth/vendor-register
pub async fn register_vendor(
    State(state): State<AppState>,
    Json(req): Json<RegisterVendorRequest>,
) -> Result<Json<ApiResponse<RegisterResponse>>> {
    req.validate()?;

    let user_id = insert_user(
        &state,
        &req.email,
        &req.password,
        &req.vendor_name,
        UserRole::Vendor,
    )
    .await?;

    let signup = state
        .signups
        .register_vendor(NewVendorSignup {
            user_id,
            email: req.email.clone(),
            vendor_name: req.vendor_name,
            vendor_type: req.vendor_type,
            country: req.country,
            contact_name: req.contact_name,
            contact_phone: req.contact_phone,
        })
        .await?;

    info!(user_id = %user_id, signup_id = signup.id, "商户账号注册完成");

    Ok(Json(ApiResponse::success_with_message(
        RegisterResponse {
            user_id,
            signup_id: signup.id,
            signup_status: signup.status.as_str().to_string(),
        },
        "注册成功，等待管理员审核",
    )))
}

/// 登录
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    req.validate()?;

    let user: UserRow = sqlx::query_as(
        r#"
        SELECT id, email, password_hash, display_name, role, status,
               failed_login_attempts, locked_until, last_login_at, created_at
        FROM user_profiles
        WHERE email = $1
        "#,
    )
    .bind(&req.email)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AdminError::InvalidCredentials)?;

    if user.status == "disabled" {
        return Err(AdminError::UserDisabled);
    }

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AdminError::UserLocked);
        }
    }

    let password_valid = verify_password(&req.password, &user.password_hash)?;
    if !password_valid {
        // 更新失败次数，达到阈值锁定 30 分钟
        let new_attempts = user.failed_login_attempts + 1;
        let locked_until = if new_attempts >= MAX_FAILED_LOGINS {
            Some(Utc::now() + chrono::Duration::minutes(LOCK_MINUTES))
        } else {
            None
        };

        sqlx::query(
            r#"
            UPDATE user_profiles
            SET failed_login_attempts = $1, locked_until = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(new_attempts)
        .bind(locked_until)
        .bind(user.id)
        .execute(&state.pool)
        .await?;

        if locked_until.is_some() {
            warn!(user_id = %user.id, "连续登录失败，账号已锁定");
        }

        return Err(AdminError::InvalidCredentials);
    }

    // 重置失败次数，更新最后登录时间
    sqlx::query(
        r#"
        UPDATE user_profiles
        SET failed_login_attempts = 0, locked_until = NULL, last_login_at = NOW(), updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user.id)
    .execute(&state.pool)
    .await?;

    let (token, expires_at) = state.jwt_manager.generate_token(
        user.id,
        &user.email,
        user.display_name.as_deref(),
        user.role,
    )?;

    info!(user_id = %user.id, role = user.role.as_str(), "登录成功");

    Ok(Json(ApiResponse::success(LoginResponse {
        token,
        user: user.into_dto(),
        expires_at,
    })))
}

/// 获取当前用户
///
/// GET /api/auth/me
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserDto>>> {
    let user_id = claims.user_id()?;

    let user: UserRow = sqlx::query_as(
        r#"
        SELECT id, email, password_hash, display_name, role, status,
               failed_login_attempts, locked_until, last_login_at, created_at
        FROM user_profiles
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AdminError::UserNotFound(user_id.to_string()))?;

    Ok(Json(ApiResponse::success(user.into_dto())))
}

/// 刷新 Token
///
/// POST /api/auth/refresh
pub async fn refresh_token(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<RefreshResponse>>> {
    let (token, expires_at) = state.jwt_manager.refresh_token(&claims)?;

    Ok(Json(ApiResponse::success(RefreshResponse {
        token,
        expires_at,
    })))
}
