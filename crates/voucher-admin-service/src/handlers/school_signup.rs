//! 学校注册审核 API 处理器

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use voucher_management::models::{SchoolSignup, SchoolSignupStatus};
use voucher_management::service::SchoolReviewAction;

use crate::auth::Claims;
use crate::dto::ApiResponse;
use crate::error::Result;
use crate::state::AppState;

/// 列表过滤参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupListQuery {
    pub status: Option<SchoolSignupStatus>,
}

/// 审核请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSchoolSignupRequest {
    pub action: SchoolReviewAction,
    #[validate(length(max = 2000, message = "审核备注不能超过 2000 字符"))]
    pub notes: Option<String>,
}

/// 列出学校注册记录（管理员）
///
/// GET /api/admin/school-signups
pub async fn list_school_signups(
    State(state): State<AppState>,
    Query(query): Query<SignupListQuery>,
) -> Result<Json<ApiResponse<Vec<SchoolSignup>>>> {
    let signups = state.signups.list_school_signups(query.status).await?;
    Ok(Json(ApiResponse::success(signups)))
}

/// 审核学校注册（管理员）
///
/// POST /api/admin/school-signups/{id}/review
pub async fn review_school_signup(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<ReviewSchoolSignupRequest>,
) -> Result<Json<ApiResponse<SchoolSignup>>> {
    req.validate()?;
    let reviewer = claims.user_id()?;

    let signup = state
        .signups
        .review_school_signup(id, req.action, reviewer, req.notes)
        .await?;

    Ok(Json(ApiResponse::success(signup)))
}

/// 查询自己的注册状态（学校）
///
/// GET /api/school/signup-status
pub async fn my_signup_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Option<SchoolSignup>>>> {
    let user_id = claims.user_id()?;
    let signup = state.signups.school_signup_by_user(user_id).await?;
    Ok(Json(ApiResponse::success(signup)))
}
