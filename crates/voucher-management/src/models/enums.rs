//! 凭证服务枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化

use serde::{Deserialize, Serialize};

/// 学校注册审核状态
///
/// 注册记录由学校自助创建，仅管理员可以变更状态，记录永不删除
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum SchoolSignupStatus {
    /// 待审核 - 刚提交，等待管理员处理
    #[default]
    Pending,
    /// 已通过 - 学校账号获得完整访问权
    Approved,
    /// 已拒绝 - 终态
    Rejected,
    /// 候补中 - 名额不足时暂挂，可再转为通过/拒绝
    Waitlisted,
}

impl SchoolSignupStatus {
    /// 是否为终态（终态记录不允许再次审核）
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// 检查状态流转是否合法
    ///
    /// pending 可转任意审核结果；waitlisted 可转通过/拒绝；终态不可再转
    pub fn can_transition_to(&self, target: Self) -> bool {
        match self {
            Self::Pending => matches!(
                target,
                Self::Approved | Self::Rejected | Self::Waitlisted
            ),
            Self::Waitlisted => matches!(target, Self::Approved | Self::Rejected),
            Self::Approved | Self::Rejected => false,
        }
    }

    /// 数据库中的字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Waitlisted => "waitlisted",
        }
    }
}

/// 商户注册审核状态
///
/// 商户入驻比学校多一个资质复核环节，通过后还需激活才能提交兑换码
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum VendorSignupStatus {
    /// 已提交 - 刚注册
    #[default]
    Submitted,
    /// 复核中 - 管理员正在核验资质
    UnderReview,
    /// 已通过 - 资质核验通过，待激活
    Approved,
    /// 已激活 - 可以提交兑换码
    Active,
    /// 已停用 - 风险处置或违规暂停
    Suspended,
}

impl VendorSignupStatus {
    /// 检查状态流转是否合法
    ///
    /// 正向流转 submitted -> under_review -> approved -> active，
    /// active 可被停用，suspended 可恢复为 active
    pub fn can_transition_to(&self, target: Self) -> bool {
        match self {
            Self::Submitted => matches!(target, Self::UnderReview | Self::Approved),
            Self::UnderReview => matches!(target, Self::Approved | Self::Suspended),
            Self::Approved => matches!(target, Self::Active | Self::Suspended),
            Self::Active => matches!(target, Self::Suspended),
            Self::Suspended => matches!(target, Self::Active),
        }
    }

    /// 数据库中的字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }
}

/// 三态审核状态
///
/// 奖学金申请、拨款申请和商户兑换码提交共用的审核生命周期
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum ReviewStatus {
    /// 待审核
    #[default]
    Pending,
    /// 已通过
    Approved,
    /// 已拒绝
    Rejected,
}

impl ReviewStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// 数据库中的字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// 兑换凭证状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum VoucherStatus {
    /// 有效 - 可被商户核销
    #[default]
    Active,
    /// 已使用 - 商户提交被管理员批准后置为此态
    Used,
    /// 已过期
    Expired,
    /// 已作废 - 管理员手动撤销
    Cancelled,
}

impl VoucherStatus {
    /// 数据库中的字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Used => "used",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

/// 兑换码核验结果分类
///
/// 提交时由系统计算，写入后不再变更
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum VerificationStatus {
    /// 有效 - 命中已批准的申请或有效凭证
    Valid,
    /// 无效 - 码存在但未处于可核销状态
    Invalid,
    /// 未找到 - 两张表中均不存在
    NotFound,
}

impl VerificationStatus {
    /// 数据库中的字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::NotFound => "not_found",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_school_signup_transitions() {
        assert!(SchoolSignupStatus::Pending.can_transition_to(SchoolSignupStatus::Approved));
        assert!(SchoolSignupStatus::Pending.can_transition_to(SchoolSignupStatus::Waitlisted));
        assert!(SchoolSignupStatus::Waitlisted.can_transition_to(SchoolSignupStatus::Approved));
        assert!(!SchoolSignupStatus::Approved.can_transition_to(SchoolSignupStatus::Rejected));
        assert!(!SchoolSignupStatus::Rejected.can_transition_to(SchoolSignupStatus::Approved));
    }

    #[test]
    fn test_vendor_signup_transitions() {
        assert!(VendorSignupStatus::Submitted.can_transition_to(VendorSignupStatus::UnderReview));
        assert!(VendorSignupStatus::UnderReview.can_transition_to(VendorSignupStatus::Approved));
        assert!(VendorSignupStatus::Approved.can_transition_to(VendorSignupStatus::Active));
        assert!(VendorSignupStatus::Active.can_transition_to(VendorSignupStatus::Suspended));
        assert!(VendorSignupStatus::Suspended.can_transition_to(VendorSignupStatus::Active));
        assert!(!VendorSignupStatus::Submitted.can_transition_to(VendorSignupStatus::Active));
    }

    #[test]
    fn test_review_status_terminal() {
        assert!(!ReviewStatus::Pending.is_terminal());
        assert!(ReviewStatus::Approved.is_terminal());
        assert!(ReviewStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_verification_status_serialization() {
        let json = serde_json::to_value(VerificationStatus::NotFound).unwrap();
        assert_eq!(json, "not_found");
    }

    #[test]
    fn test_as_str_matches_serde() {
        let json = serde_json::to_value(VendorSignupStatus::UnderReview).unwrap();
        assert_eq!(json, VendorSignupStatus::UnderReview.as_str());
    }
}
