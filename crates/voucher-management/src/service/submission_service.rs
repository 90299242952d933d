//! 商户提交服务
//!
//! 商户提交兑换码时立即核验并持久化分类结果；管理员审批通过时
//! 在同一事务中核销对应凭证。

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::code::normalize_code;
use crate::error::{Result, VoucherError};
use crate::models::{
    NewVendorVoucherSubmission, ReviewStatus, VendorVoucherSubmission,
};
use crate::repository::{SubmissionRepository, VoucherRepository};
use crate::service::dto::{ReviewDecision, SubmissionResult};
use crate::service::verification_service::VerificationService;

/// 商户提交服务
pub struct SubmissionService {
    repo: Arc<SubmissionRepository>,
    verification: Arc<VerificationService>,
    pool: PgPool,
}

impl SubmissionService {
    pub fn new(
        repo: Arc<SubmissionRepository>,
        verification: Arc<VerificationService>,
        pool: PgPool,
    ) -> Self {
        Self {
            repo,
            verification,
            pool,
        }
    }

    /// 商户提交兑换码
    ///
    /// 先核验后落库：核验分类（valid/invalid/not_found）写入后不再
    /// 变更；仅核验有效的提交进入待审批队列，其余直接置为 rejected。
    /// 核验阶段存储不可达时整个操作失败，不持久化任何记录。
    #[instrument(skip(self, raw_code), fields(vendor_id = %vendor_id))]
    pub async fn submit_code(&self, vendor_id: Uuid, raw_code: &str) -> Result<SubmissionResult> {
        let outcome = self.verification.verify(raw_code).await?;
        let code = normalize_code(raw_code);

        let status = if outcome.is_valid() {
            ReviewStatus::Pending
        } else {
            ReviewStatus::Rejected
        };

        let input = NewVendorVoucherSubmission {
            vendor_id,
            voucher_code: code.clone(),
            voucher_application_id: outcome.matched_application_id(),
            status,
            verification_status: outcome.verification_status(),
        };
        let id = self.repo.create(&input).await?;

        info!(
            submission_id = id,
            voucher_code = %code,
            verification_status = outcome.verification_status().as_str(),
            "商户兑换码提交已记录"
        );

        let submission = self
            .repo
            .get(id)
            .await?
            .ok_or(VoucherError::SubmissionNotFound(id))?;

        Ok(SubmissionResult {
            submission,
            outcome,
        })
    }

    /// 获取单条提交记录
    pub async fn get(&self, id: i64) -> Result<VendorVoucherSubmission> {
        self.repo
            .get(id)
            .await?
            .ok_or(VoucherError::SubmissionNotFound(id))
    }

    /// 列出提交记录（管理员视角）
    pub async fn list(&self, status: Option<ReviewStatus>) -> Result<Vec<VendorVoucherSubmission>> {
        self.repo.list(status).await
    }

    /// 列出某商户的全部提交记录
    pub async fn list_by_vendor(&self, vendor_id: Uuid) -> Result<Vec<VendorVoucherSubmission>> {
        self.repo.list_by_vendor(vendor_id).await
    }

    /// 管理员审批提交记录
    ///
    /// 批准时在同一事务中将命中的凭证标记为已使用；拨款类兑换码
    /// 以外不存在对应凭证时仅记录告警（旧系统迁移数据可能只在
    /// 申请表持码）。
    #[instrument(skip(self, notes), fields(submission_id = id, reviewer = %reviewer))]
    pub async fn review(
        &self,
        id: i64,
        decision: ReviewDecision,
        reviewer: Uuid,
        notes: Option<String>,
    ) -> Result<VendorVoucherSubmission> {
        let submission = self
            .repo
            .get(id)
            .await?
            .ok_or(VoucherError::SubmissionNotFound(id))?;

        if submission.status.is_terminal() {
            return Err(VoucherError::InvalidStatusTransition {
                entity: "vendor_voucher_submission",
                id,
                from: submission.status.as_str().to_string(),
                to: match decision {
                    ReviewDecision::Approve => "approved".to_string(),
                    ReviewDecision::Reject => "rejected".to_string(),
                },
            });
        }

        let status = match decision {
            ReviewDecision::Approve => ReviewStatus::Approved,
            ReviewDecision::Reject => ReviewStatus::Rejected,
        };

        let mut tx = self.pool.begin().await?;

        let updated =
            SubmissionRepository::review_in_tx(&mut tx, id, status, reviewer, notes.as_deref())
                .await?;
        if updated == 0 {
            return Err(VoucherError::InvalidStatusTransition {
                entity: "vendor_voucher_submission",
                id,
                from: "non-pending".to_string(),
                to: status.as_str().to_string(),
            });
        }

        if decision == ReviewDecision::Approve {
            let marked =
                VoucherRepository::mark_used_in_tx(&mut tx, &submission.voucher_code).await?;
            match marked {
                Some(voucher_id) => {
                    info!(submission_id = id, voucher_id, "凭证已核销");
                }
                None => {
                    warn!(
                        submission_id = id,
                        voucher_code = %submission.voucher_code,
                        "批准的提交没有对应的有效凭证记录"
                    );
                }
            }
        }

        tx.commit().await?;

        info!(submission_id = id, status = status.as_str(), "提交记录审批完成");

        self.repo
            .get(id)
            .await?
            .ok_or(VoucherError::SubmissionNotFound(id))
    }
}
