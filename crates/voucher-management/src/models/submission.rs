//! 商户兑换码提交实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ReviewStatus, VerificationStatus};

/// 商户兑换码提交记录
///
/// 商户提交兑换码时系统立即核验并写入 verification_status（此后不可变）；
/// status 是管理员侧的审批状态，仅核验有效的提交进入待审批队列。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VendorVoucherSubmission {
    pub id: i64,
    pub vendor_id: Uuid,
    /// 规范化（去空白、大写）后的兑换码
    pub voucher_code: String,
    /// 核验命中的奖学金申请（如有）
    #[sqlx(default)]
    pub voucher_application_id: Option<i64>,
    pub status: ReviewStatus,
    pub verification_status: VerificationStatus,
    pub submitted_at: DateTime<Utc>,
    #[sqlx(default)]
    pub reviewed_by: Option<Uuid>,
    #[sqlx(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub review_notes: Option<String>,
}

/// 新建商户提交记录的输入
#[derive(Debug, Clone)]
pub struct NewVendorVoucherSubmission {
    pub vendor_id: Uuid,
    pub voucher_code: String,
    pub voucher_application_id: Option<i64>,
    pub status: ReviewStatus,
    pub verification_status: VerificationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_serialization() {
        let submission = VendorVoucherSubmission {
            id: 9,
            vendor_id: Uuid::nil(),
            voucher_code: "GBF-AB3X-9Q7K".to_string(),
            voucher_application_id: Some(4),
            status: ReviewStatus::Pending,
            verification_status: VerificationStatus::Valid,
            submitted_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
        };

        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["voucherCode"], "GBF-AB3X-9Q7K");
        assert_eq!(json["verificationStatus"], "valid");
        assert_eq!(json["voucherApplicationId"], 4);
    }
}
