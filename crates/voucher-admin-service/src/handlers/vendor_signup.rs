//! 商户注册审核 API 处理器

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use voucher_management::models::{VendorSignup, VendorSignupStatus};

use crate::auth::Claims;
use crate::dto::ApiResponse;
use crate::error::Result;
use crate::state::AppState;

/// 列表过滤参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupListQuery {
    pub status: Option<VendorSignupStatus>,
}

/// 审核请求
///
/// risk_flag 为空时保持原值
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewVendorSignupRequest {
    pub status: VendorSignupStatus,
    pub risk_flag: Option<bool>,
    #[validate(length(max = 2000, message = "审核备注不能超过 2000 字符"))]
    pub notes: Option<String>,
}

/// 列出商户注册记录（管理员）
///
/// GET /api/admin/vendor-signups
pub async fn list_vendor_signups(
    State(state): State<AppState>,
    Query(query): Query<SignupListQuery>,
) -> Result<Json<ApiResponse<Vec<VendorSignup>>>> {
    let signups = state.signups.list_vendor_signups(query.status).await?;
    Ok(Json(ApiResponse::success(signups)))
}

/// 审核商户注册（管理员）
///
/// POST /api/admin/vendor-signups/{id}/review
pub async fn review_vendor_signup(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<ReviewVendorSignupRequest>,
) -> Result<Json<ApiResponse<VendorSignup>>> {
    req.validate()?;
    let reviewer = claims.user_id()?;

    let signup = state
        .signups
        .review_vendor_signup(id, req.status, req.risk_flag, reviewer, req.notes)
        .await?;

    Ok(Json(ApiResponse::success(signup)))
}

/// 查询自己的注册状态（商户）
///
/// GET /api/vendor/signup-status
pub async fn my_signup_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Option<VendorSignup>>>> {
    let user_id = claims.user_id()?;
    let signup = state.signups.vendor_signup_by_user(user_id).await?;
    Ok(Json(ApiResponse::success(signup)))
}
