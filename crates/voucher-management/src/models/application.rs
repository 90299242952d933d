//! 申请类实体定义
//!
//! 包含奖学金申请和学校直接发起的拨款申请

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ReviewStatus;

/// 奖学金申请
///
/// 由学校账号代学生提交。批准且带金额时生成兑换码写入本记录，
/// 同时在 vouchers 表生成一条核销用投影记录。
///
/// 不变量：voucher_code 仅在 status = approved 时非空，写入后不可变，
/// 且在所有持码表中全局唯一。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipApplication {
    pub id: i64,
    pub student_name: String,
    pub email: String,
    #[sqlx(default)]
    pub phone: Option<String>,
    pub school_name: String,
    #[sqlx(default)]
    pub district: Option<String>,
    #[sqlx(default)]
    pub grade_level: Option<String>,
    pub program_type: String,
    #[sqlx(default)]
    pub financial_need_description: Option<String>,
    #[sqlx(default)]
    pub academic_goals: Option<String>,
    pub student_count: i32,
    /// 申请金额（美元整数）；为空表示非拨款类申请
    #[sqlx(default)]
    pub voucher_amount: Option<i64>,
    #[sqlx(default)]
    pub voucher_code: Option<String>,
    pub country: String,
    pub status: ReviewStatus,
    pub applied_date: DateTime<Utc>,
    #[sqlx(default)]
    pub reviewed_by: Option<Uuid>,
    #[sqlx(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub notes: Option<String>,
    /// 提交申请的学校账号
    pub school_user_id: Uuid,
}

impl ScholarshipApplication {
    /// 批准时是否需要发放兑换码
    pub fn requires_voucher(&self) -> bool {
        self.voucher_amount.is_some()
    }
}

/// 新建奖学金申请的输入
#[derive(Debug, Clone)]
pub struct NewScholarshipApplication {
    pub student_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub school_name: String,
    pub district: Option<String>,
    pub grade_level: Option<String>,
    pub program_type: String,
    pub financial_need_description: Option<String>,
    pub academic_goals: Option<String>,
    pub student_count: i32,
    pub voucher_amount: Option<i64>,
    pub country: String,
    pub school_user_id: Uuid,
}

/// 拨款申请
///
/// 学校直接申请一笔资金，独立于奖学金申请；批准时生成 Voucher 记录
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VoucherRequest {
    pub id: i64,
    pub school_user_id: Uuid,
    pub school_name: String,
    /// 审核结果通知邮箱
    pub contact_email: String,
    /// 申请金额（美元整数）
    pub amount: i64,
    pub purpose: String,
    #[sqlx(default)]
    pub justification: Option<String>,
    pub status: ReviewStatus,
    pub requested_at: DateTime<Utc>,
    #[sqlx(default)]
    pub reviewed_by: Option<Uuid>,
    #[sqlx(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub review_notes: Option<String>,
}

/// 新建拨款申请的输入
#[derive(Debug, Clone)]
pub struct NewVoucherRequest {
    pub school_user_id: Uuid,
    pub school_name: String,
    pub contact_email: String,
    pub amount: i64,
    pub purpose: String,
    pub justification: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_application(amount: Option<i64>) -> ScholarshipApplication {
        ScholarshipApplication {
            id: 1,
            student_name: "Amara Osei".to_string(),
            email: "school@example.org".to_string(),
            phone: None,
            school_name: "Riverside Academy".to_string(),
            district: None,
            grade_level: Some("Grade 8".to_string()),
            program_type: "STEM Program".to_string(),
            financial_need_description: None,
            academic_goals: None,
            student_count: 1,
            voucher_amount: amount,
            voucher_code: None,
            country: "US".to_string(),
            status: ReviewStatus::Pending,
            applied_date: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            notes: None,
            school_user_id: Uuid::nil(),
        }
    }

    #[test]
    fn test_requires_voucher() {
        assert!(sample_application(Some(500)).requires_voucher());
        assert!(!sample_application(None).requires_voucher());
    }

    #[test]
    fn test_application_serialization_is_camel_case() {
        let app = sample_application(Some(500));
        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["studentName"], "Amara Osei");
        assert_eq!(json["voucherAmount"], 500);
        assert_eq!(json["status"], "pending");
        assert!(json["voucherCode"].is_null());
    }
}
