//! 拨款申请 API 处理器

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use voucher_management::models::{NewVoucherRequest, ReviewStatus, VoucherRequest};
use voucher_management::service::ReviewDecision;

use crate::auth::Claims;
use crate::dto::ApiResponse;
use crate::error::Result;
use crate::state::AppState;

/// 提交拨款申请请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoucherRequestRequest {
    #[validate(length(min = 1, max = 200, message = "学校名称长度必须在 1-200 之间"))]
    pub school_name: String,
    #[validate(range(min = 1, message = "申请金额必须为正数"))]
    pub amount: i64,
    #[validate(length(min = 1, max = 200, message = "用途长度必须在 1-200 之间"))]
    pub purpose: String,
    pub justification: Option<String>,
}

/// 列表过滤参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestListQuery {
    pub status: Option<ReviewStatus>,
}

/// 审核请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewVoucherRequestRequest {
    pub decision: ReviewDecision,
    #[validate(length(max = 2000, message = "审核备注不能超过 2000 字符"))]
    pub notes: Option<String>,
}

/// 提交拨款申请（学校）
///
/// POST /api/voucher-requests
pub async fn submit_voucher_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitVoucherRequestRequest>,
) -> Result<Json<ApiResponse<VoucherRequest>>> {
    req.validate()?;
    let school_user_id = claims.user_id()?;

    let request = state
        .applications
        .submit_request(NewVoucherRequest {
            school_user_id,
            school_name: req.school_name,
            contact_email: claims.email.clone(),
            amount: req.amount,
            purpose: req.purpose,
            justification: req.justification,
        })
        .await?;

    Ok(Json(ApiResponse::success_with_message(
        request,
        "拨款申请提交成功，等待审核",
    )))
}

/// 查看自己的拨款申请（学校）
///
/// GET /api/voucher-requests/mine
pub async fn my_voucher_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<VoucherRequest>>>> {
    let school_user_id = claims.user_id()?;
    let requests = state
        .applications
        .list_requests_by_school(school_user_id)
        .await?;
    Ok(Json(ApiResponse::success(requests)))
}

/// 列出全部拨款申请（管理员）
///
/// GET /api/admin/voucher-requests
pub async fn list_voucher_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<ApiResponse<Vec<VoucherRequest>>>> {
    let requests = state.applications.list_requests(query.status).await?;
    Ok(Json(ApiResponse::success(requests)))
}

/// 审核拨款申请（管理员）
///
/// POST /api/admin/voucher-requests/{id}/review
///
/// 批准时生成兑换凭证记录
pub async fn review_voucher_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<ReviewVoucherRequestRequest>,
) -> Result<Json<ApiResponse<VoucherRequest>>> {
    req.validate()?;
    let reviewer = claims.user_id()?;

    let request = state
        .applications
        .review_request(id, req.decision, reviewer, req.notes)
        .await?;

    Ok(Json(ApiResponse::success(request)))
}
