//! 服务层数据传输对象

use serde::{Deserialize, Serialize};

use crate::models::VendorVoucherSubmission;
use crate::service::verification_service::VerificationOutcome;

/// 二元审批决定（批准/拒绝）
///
/// 奖学金申请、拨款申请和商户提交共用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// 学校注册的审核动作
///
/// 相比二元决定多一个候补选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolReviewAction {
    Approve,
    Reject,
    Waitlist,
}

/// 商户提交兑换码的结果
///
/// 同时携带持久化后的提交记录与核验分类，供接口层组织响应
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    pub submission: VendorVoucherSubmission,
    pub outcome: VerificationOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_decision_deserialization() {
        let decision: ReviewDecision = serde_json::from_str("\"approve\"").unwrap();
        assert_eq!(decision, ReviewDecision::Approve);

        let action: SchoolReviewAction = serde_json::from_str("\"waitlist\"").unwrap();
        assert_eq!(action, SchoolReviewAction::Waitlist);
    }
}
