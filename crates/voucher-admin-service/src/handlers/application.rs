//! 奖学金申请 API 处理器

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use voucher_management::models::{NewScholarshipApplication, ReviewStatus, ScholarshipApplication};
use voucher_management::service::ReviewDecision;

use crate::auth::Claims;
use crate::dto::ApiResponse;
use crate::error::Result;
use crate::state::AppState;

/// 提交申请请求
///
/// 联系邮箱取自学校账号，不在表单中出现
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    #[validate(length(min = 1, max = 200, message = "学生姓名长度必须在 1-200 之间"))]
    pub student_name: String,
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 200, message = "学校名称长度必须在 1-200 之间"))]
    pub school_name: String,
    pub district: Option<String>,
    pub grade_level: Option<String>,
    #[validate(length(min = 1, max = 100, message = "项目类型长度必须在 1-100 之间"))]
    pub program_type: String,
    pub financial_need_description: Option<String>,
    pub academic_goals: Option<String>,
    #[validate(range(min = 1, message = "学生人数必须为正数"))]
    pub student_count: i32,
    #[validate(range(min = 1, message = "申请金额必须为正数"))]
    pub voucher_amount: Option<i64>,
    #[validate(length(min = 2, max = 100, message = "国家长度必须在 2-100 之间"))]
    pub country: String,
}

/// 列表过滤参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListQuery {
    pub status: Option<ReviewStatus>,
}

/// 审核请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewApplicationRequest {
    pub decision: ReviewDecision,
    #[validate(length(max = 2000, message = "审核备注不能超过 2000 字符"))]
    pub notes: Option<String>,
}

/// 提交奖学金申请（学校）
///
/// POST /api/applications
pub async fn submit_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitApplicationRequest>,
) -> Result<Json<ApiResponse<ScholarshipApplication>>> {
    req.validate()?;
    let school_user_id = claims.user_id()?;

    let application = state
        .applications
        .submit(NewScholarshipApplication {
            student_name: req.student_name,
            email: claims.email.clone(),
            phone: req.phone,
            school_name: req.school_name,
            district: req.district,
            grade_level: req.grade_level,
            program_type: req.program_type,
            financial_need_description: req.financial_need_description,
            academic_goals: req.academic_goals,
            student_count: req.student_count,
            voucher_amount: req.voucher_amount,
            country: req.country,
            school_user_id,
        })
        .await?;

    Ok(Json(ApiResponse::success_with_message(
        application,
        "申请提交成功，等待审核",
    )))
}

/// 查看自己的申请（学校）
///
/// GET /api/applications/mine
pub async fn my_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<ScholarshipApplication>>>> {
    let school_user_id = claims.user_id()?;
    let applications = state.applications.list_by_school(school_user_id).await?;
    Ok(Json(ApiResponse::success(applications)))
}

/// 列出全部申请（管理员）
///
/// GET /api/admin/applications
pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<Json<ApiResponse<Vec<ScholarshipApplication>>>> {
    let applications = state.applications.list(query.status).await?;
    Ok(Json(ApiResponse::success(applications)))
}

/// 审核申请（管理员）
///
/// POST /api/admin/applications/{id}/review
///
/// 批准带金额的申请会发放兑换码并异步发送邮件通知
pub async fn review_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<ReviewApplicationRequest>,
) -> Result<Json<ApiResponse<ScholarshipApplication>>> {
    req.validate()?;
    let reviewer = claims.user_id()?;

    let application = state
        .applications
        .review(id, req.decision, reviewer, req.notes)
        .await?;

    Ok(Json(ApiResponse::success(application)))
}
