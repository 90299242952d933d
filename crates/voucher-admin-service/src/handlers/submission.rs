//! 商户兑换码提交 API 处理器

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use voucher_management::models::{ReviewStatus, VendorVoucherSubmission};
use voucher_management::service::{ReviewDecision, VerificationOutcome};

use crate::auth::Claims;
use crate::dto::ApiResponse;
use crate::error::Result;
use crate::state::AppState;

/// 提交兑换码请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoucherCodeRequest {
    #[validate(length(min = 1, max = 50, message = "兑换码长度必须在 1-50 之间"))]
    pub voucher_code: String,
}

/// 提交兑换码响应
///
/// verification 为提交时计算的核验分类；valid 的提交进入管理员
/// 审批队列，其余直接被拒绝
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoucherCodeResponse {
    pub submission: VendorVoucherSubmission,
    pub verification_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// 列表过滤参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionListQuery {
    pub status: Option<ReviewStatus>,
}

/// 审批请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmissionRequest {
    pub decision: ReviewDecision,
    #[validate(length(max = 2000, message = "审核备注不能超过 2000 字符"))]
    pub notes: Option<String>,
}

/// 提交兑换码（商户）
///
/// POST /api/vendor/submissions
pub async fn submit_voucher_code(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitVoucherCodeRequest>,
) -> Result<Json<ApiResponse<SubmitVoucherCodeResponse>>> {
    req.validate()?;
    let vendor_id = claims.user_id()?;

    let result = state
        .submissions
        .submit_code(vendor_id, &req.voucher_code)
        .await?;

    let reason = match &result.outcome {
        VerificationOutcome::Invalid { reason, .. } => Some(reason.clone()),
        VerificationOutcome::NotFound => {
            Some("Voucher code not found in database".to_string())
        }
        VerificationOutcome::Valid(_) => None,
    };

    let message = if result.outcome.is_valid() {
        "兑换码核验通过，已进入管理员审批队列"
    } else {
        "兑换码核验未通过，提交已被拒绝"
    };

    let verification_status = result.outcome.verification_status().as_str().to_string();

    Ok(Json(ApiResponse::success_with_message(
        SubmitVoucherCodeResponse {
            submission: result.submission,
            verification_status,
            reason,
        },
        message,
    )))
}

/// 查看自己的提交记录（商户）
///
/// GET /api/vendor/submissions
pub async fn my_submissions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<VendorVoucherSubmission>>>> {
    let vendor_id = claims.user_id()?;
    let submissions = state.submissions.list_by_vendor(vendor_id).await?;
    Ok(Json(ApiResponse::success(submissions)))
}

/// 列出全部提交记录（管理员）
///
/// GET /api/admin/submissions
pub async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<ApiResponse<Vec<VendorVoucherSubmission>>>> {
    let submissions = state.submissions.list(query.status).await?;
    Ok(Json(ApiResponse::success(submissions)))
}

/// 审批提交记录（管理员）
///
/// POST /api/admin/submissions/{id}/review
///
/// 批准时在同一事务中核销对应的兑换凭证
pub async fn review_submission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<ReviewSubmissionRequest>,
) -> Result<Json<ApiResponse<VendorVoucherSubmission>>> {
    req.validate()?;
    let reviewer = claims.user_id()?;

    let submission = state
        .submissions
        .review(id, req.decision, reviewer, req.notes)
        .await?;

    Ok(Json(ApiResponse::success(submission)))
}
