//! 兑换凭证实体定义
//!
//! vouchers 表是面向商户核销的规范化记录，仅作为批准奖学金申请
//! 或批准拨款申请的副作用产生

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::VoucherStatus;

/// 兑换凭证
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub id: i64,
    /// 兑换码（全局唯一，与申请表中的码共享同一命名空间）
    pub voucher_code: String,
    /// 所属学校账号
    pub school_id: Uuid,
    /// 金额（美元整数）
    pub amount: i64,
    pub purpose: String,
    pub status: VoucherStatus,
    /// 创建该凭证的管理员
    pub created_by: Uuid,
    /// 来源奖学金申请（如有）
    #[sqlx(default)]
    pub application_id: Option<i64>,
    /// 来源拨款申请（如有）
    #[sqlx(default)]
    pub request_id: Option<i64>,
    #[sqlx(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Voucher {
    /// 是否可被商户核销
    pub fn is_redeemable(&self) -> bool {
        if self.status != VoucherStatus::Active {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => expires_at > Utc::now(),
            None => true,
        }
    }
}

/// 新建兑换凭证的输入
#[derive(Debug, Clone)]
pub struct NewVoucher {
    pub voucher_code: String,
    pub school_id: Uuid,
    pub amount: i64,
    pub purpose: String,
    pub created_by: Uuid,
    pub application_id: Option<i64>,
    pub request_id: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_voucher(status: VoucherStatus, expires_at: Option<DateTime<Utc>>) -> Voucher {
        Voucher {
            id: 1,
            voucher_code: "GBF-AB3X-9Q7K".to_string(),
            school_id: Uuid::nil(),
            amount: 500,
            purpose: "STEM Program".to_string(),
            status,
            created_by: Uuid::nil(),
            application_id: Some(1),
            request_id: None,
            expires_at,
            used_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_redeemable() {
        assert!(sample_voucher(VoucherStatus::Active, None).is_redeemable());
        assert!(
            sample_voucher(VoucherStatus::Active, Some(Utc::now() + Duration::days(30)))
                .is_redeemable()
        );
        assert!(
            !sample_voucher(VoucherStatus::Active, Some(Utc::now() - Duration::days(1)))
                .is_redeemable()
        );
        assert!(!sample_voucher(VoucherStatus::Used, None).is_redeemable());
        assert!(!sample_voucher(VoucherStatus::Cancelled, None).is_redeemable());
    }
}
