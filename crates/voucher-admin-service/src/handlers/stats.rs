//! 统计报表 API 处理器
//!
//! 管理面板的计数总览

use axum::{Json, extract::State};
use sqlx::Row;

use crate::dto::{ApiResponse, StatsOverview};
use crate::error::Result;
use crate::state::AppState;

/// 管理面板统计总览（管理员）
///
/// GET /api/admin/stats
pub async fn get_overview(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StatsOverview>>> {
    let row = sqlx::query(
        r#"
        SELECT
            (SELECT COUNT(*) FROM scholarship_applications) AS total_applications,
            (SELECT COUNT(*) FROM scholarship_applications WHERE status = 'pending') AS pending_applications,
            (SELECT COUNT(*) FROM scholarship_applications WHERE status = 'approved') AS approved_applications,
            (SELECT COUNT(*) FROM scholarship_applications WHERE status = 'rejected') AS rejected_applications,
            (SELECT COUNT(*) FROM school_signups WHERE status = 'pending') AS pending_school_signups,
            (SELECT COUNT(*) FROM vendor_signups WHERE status IN ('submitted', 'under_review')) AS pending_vendor_signups,
            (SELECT COUNT(*) FROM vendor_voucher_submissions WHERE status = 'pending') AS pending_submissions,
            (SELECT COUNT(*) FROM vouchers WHERE status = 'active') AS active_vouchers,
            (SELECT COUNT(*) FROM vouchers WHERE status = 'used') AS used_vouchers,
            (SELECT COALESCE(SUM(amount), 0)::BIGINT FROM vouchers WHERE status IN ('active', 'used')) AS total_voucher_amount
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let overview = StatsOverview {
        total_applications: row.get("total_applications"),
        pending_applications: row.get("pending_applications"),
        approved_applications: row.get("approved_applications"),
        rejected_applications: row.get("rejected_applications"),
        pending_school_signups: row.get("pending_school_signups"),
        pending_vendor_signups: row.get("pending_vendor_signups"),
        pending_submissions: row.get("pending_submissions"),
        active_vouchers: row.get("active_vouchers"),
        used_vouchers: row.get("used_vouchers"),
        total_voucher_amount: row.get("total_voucher_amount"),
    };

    Ok(Json(ApiResponse::success(overview)))
}
