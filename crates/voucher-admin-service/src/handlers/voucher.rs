//! 兑换凭证管理 API 处理器
//!
//! 凭证列表、作废，以及两张持码表的一致性比对报告

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use voucher_management::models::{Voucher, VoucherStatus};
use voucher_management::service::CodeConsistencyReport;

use crate::auth::Claims;
use crate::dto::ApiResponse;
use crate::error::{AdminError, Result};
use crate::state::AppState;

/// 列表过滤参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherListQuery {
    pub status: Option<VoucherStatus>,
}

/// 查看自己学校的凭证（学校）
///
/// GET /api/vouchers/mine
pub async fn my_vouchers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<Voucher>>>> {
    let school_id = claims.user_id()?;
    let vouchers = state.vouchers.list_by_school(school_id).await?;
    Ok(Json(ApiResponse::success(vouchers)))
}

/// 列出全部凭证（管理员）
///
/// GET /api/admin/vouchers
pub async fn list_vouchers(
    State(state): State<AppState>,
    Query(query): Query<VoucherListQuery>,
) -> Result<Json<ApiResponse<Vec<Voucher>>>> {
    let vouchers = state.vouchers.list(query.status).await?;
    Ok(Json(ApiResponse::success(vouchers)))
}

/// 作废凭证（管理员）
///
/// POST /api/admin/vouchers/{id}/cancel
pub async fn cancel_voucher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Voucher>>> {
    let voucher = state
        .vouchers
        .get(id)
        .await?
        .ok_or(AdminError::VoucherNotFound(id))?;

    let cancelled = state.vouchers.cancel(id).await?;
    if cancelled == 0 {
        return Err(AdminError::VoucherNotActive {
            id,
            status: voucher.status.as_str().to_string(),
        });
    }

    let refreshed = state
        .vouchers
        .get(id)
        .await?
        .ok_or(AdminError::VoucherNotFound(id))?;

    Ok(Json(ApiResponse::success_with_message(
        refreshed,
        "凭证已作废",
    )))
}

/// 兑换码一致性比对报告（管理员）
///
/// GET /api/admin/consistency/voucher-codes
///
/// 找出只落在一张持码表的孤儿兑换码（旧系统的半写入遗留）
pub async fn voucher_code_consistency(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CodeConsistencyReport>>> {
    let report = state.reconcile.voucher_code_report().await?;
    Ok(Json(ApiResponse::success(report)))
}
