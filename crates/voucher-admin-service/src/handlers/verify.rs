//! 兑换码核验 API 处理器
//!
//! 对外核验端点：商户提交 `{ voucherCode }`，系统以服务身份跨表
//! 核验并返回分类结果。核验基础设施故障返回 503，绝不伪装成
//! not_found。

use axum::{Json, extract::State};
use serde::Deserialize;
use validator::Validate;

use voucher_management::VoucherError;
use voucher_management::service::VerificationOutcome;

use crate::dto::{ApiResponse, VerifyVoucherResponse};
use crate::error::{AdminError, Result};
use crate::state::AppState;

/// 核验请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyVoucherRequest {
    #[validate(length(min = 1, max = 50, message = "兑换码长度必须在 1-50 之间"))]
    pub voucher_code: String,
}

/// 核验兑换码（商户）
///
/// POST /api/vendor/verify
pub async fn verify_voucher(
    State(state): State<AppState>,
    Json(req): Json<VerifyVoucherRequest>,
) -> Result<Json<ApiResponse<VerifyVoucherResponse>>> {
    req.validate()?;

    let outcome = state
        .verification
        .verify(&req.voucher_code)
        .await
        .map_err(|e| match e {
            // 存储不可达是基础设施故障，必须与 not_found 区分
            VoucherError::Database(db_err) => {
                AdminError::VerificationUnavailable(db_err.to_string())
            }
            other => AdminError::from(other),
        })?;

    let response = match outcome {
        VerificationOutcome::Valid(valid) => VerifyVoucherResponse {
            valid: true,
            status: valid.status,
            application_id: Some(valid.application_id),
            student_name: valid.student_name,
            school_name: valid.school_name,
            voucher_amount: valid.voucher_amount,
            reason: None,
        },
        VerificationOutcome::Invalid { reason, status } => VerifyVoucherResponse {
            valid: false,
            status,
            application_id: None,
            student_name: None,
            school_name: None,
            voucher_amount: None,
            reason: Some(reason),
        },
        VerificationOutcome::NotFound => VerifyVoucherResponse {
            valid: false,
            status: "not_found".to_string(),
            application_id: None,
            student_name: None,
            school_name: None,
            voucher_amount: None,
            reason: Some("Voucher code not found in database".to_string()),
        },
    };

    Ok(Json(ApiResponse::success(response)))
}
