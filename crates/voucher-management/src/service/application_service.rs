//! 申请审核服务
//!
//! 处理奖学金申请与拨款申请的提交和审核流转。批准带金额的申请时
//! 委托发放服务生成兑换码；审核完成后发送尽力而为的邮件通知，
//! 通知失败不回滚审批结果。

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{Result, VoucherError};
use crate::models::{
    NewScholarshipApplication, NewVoucherRequest, ReviewStatus, ScholarshipApplication,
    VoucherRequest,
};
use crate::notification::Notifier;
use crate::repository::ApplicationRepository;
use crate::service::dto::ReviewDecision;
use crate::service::issuance_service::IssuanceService;

/// 申请审核服务
pub struct ApplicationService {
    repo: Arc<ApplicationRepository>,
    issuance: Arc<IssuanceService>,
    notifier: Arc<Notifier>,
}

impl ApplicationService {
    pub fn new(
        repo: Arc<ApplicationRepository>,
        issuance: Arc<IssuanceService>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            repo,
            issuance,
            notifier,
        }
    }

    // ==================== 奖学金申请 ====================

    /// 提交奖学金申请
    pub async fn submit(&self, input: NewScholarshipApplication) -> Result<ScholarshipApplication> {
        if let Some(amount) = input.voucher_amount {
            if amount <= 0 {
                return Err(VoucherError::Validation(
                    "申请金额必须为正数".to_string(),
                ));
            }
        }

        let id = self.repo.create(&input).await?;
        info!(application_id = id, school_user_id = %input.school_user_id, "奖学金申请已提交");

        self.repo
            .get(id)
            .await?
            .ok_or(VoucherError::ApplicationNotFound(id))
    }

    /// 获取单个申请
    pub async fn get(&self, id: i64) -> Result<ScholarshipApplication> {
        self.repo
            .get(id)
            .await?
            .ok_or(VoucherError::ApplicationNotFound(id))
    }

    /// 列出申请（管理员视角，可按状态过滤）
    pub async fn list(&self, status: Option<ReviewStatus>) -> Result<Vec<ScholarshipApplication>> {
        self.repo.list(status).await
    }

    /// 列出某学校账号的全部申请
    pub async fn list_by_school(
        &self,
        school_user_id: Uuid,
    ) -> Result<Vec<ScholarshipApplication>> {
        self.repo.list_by_school(school_user_id).await
    }

    /// 审核奖学金申请
    ///
    /// 批准带金额的申请时发放兑换码（状态更新与凭证投影同事务）；
    /// 邮件通知失败只记录告警。
    #[instrument(skip(self, notes), fields(application_id = id, reviewer = %reviewer))]
    pub async fn review(
        &self,
        id: i64,
        decision: ReviewDecision,
        reviewer: Uuid,
        notes: Option<String>,
    ) -> Result<ScholarshipApplication> {
        let application = self
            .repo
            .get(id)
            .await?
            .ok_or(VoucherError::ApplicationNotFound(id))?;

        if application.status.is_terminal() {
            return Err(VoucherError::InvalidStatusTransition {
                entity: "scholarship_application",
                id,
                from: application.status.as_str().to_string(),
                to: match decision {
                    ReviewDecision::Approve => "approved".to_string(),
                    ReviewDecision::Reject => "rejected".to_string(),
                },
            });
        }

        match decision {
            ReviewDecision::Approve => {
                let issued_code = if application.requires_voucher() {
                    let issued = self
                        .issuance
                        .issue_for_application(&application, reviewer, notes.as_deref())
                        .await?;
                    Some(issued.voucher_code)
                } else {
                    let updated = self
                        .repo
                        .approve_without_code(id, reviewer, notes.as_deref())
                        .await?;
                    if updated == 0 {
                        return Err(VoucherError::InvalidStatusTransition {
                            entity: "scholarship_application",
                            id,
                            from: "non-pending".to_string(),
                            to: "approved".to_string(),
                        });
                    }
                    None
                };

                info!(application_id = id, "奖学金申请已批准");
                self.notifier
                    .application_approved(&application, issued_code.as_deref())
                    .await;
            }
            ReviewDecision::Reject => {
                let updated = self.repo.reject(id, reviewer, notes.as_deref()).await?;
                if updated == 0 {
                    return Err(VoucherError::InvalidStatusTransition {
                        entity: "scholarship_application",
                        id,
                        from: "non-pending".to_string(),
                        to: "rejected".to_string(),
                    });
                }

                info!(application_id = id, "奖学金申请已拒绝");
                self.notifier.application_rejected(&application).await;
            }
        }

        self.repo
            .get(id)
            .await?
            .ok_or(VoucherError::ApplicationNotFound(id))
    }

    // ==================== 拨款申请 ====================

    /// 提交拨款申请
    pub async fn submit_request(&self, input: NewVoucherRequest) -> Result<VoucherRequest> {
        if input.amount <= 0 {
            return Err(VoucherError::Validation(
                "申请金额必须为正数".to_string(),
            ));
        }

        let id = self.repo.create_request(&input).await?;
        info!(request_id = id, school_user_id = %input.school_user_id, "拨款申请已提交");

        self.repo
            .get_request(id)
            .await?
            .ok_or(VoucherError::VoucherRequestNotFound(id))
    }

    /// 列出拨款申请（可按状态过滤）
    pub async fn list_requests(&self, status: Option<ReviewStatus>) -> Result<Vec<VoucherRequest>> {
        self.repo.list_requests(status).await
    }

    /// 列出某学校账号的全部拨款申请
    pub async fn list_requests_by_school(
        &self,
        school_user_id: Uuid,
    ) -> Result<Vec<VoucherRequest>> {
        self.repo.list_requests_by_school(school_user_id).await
    }

    /// 审核拨款申请
    ///
    /// 批准时生成 Voucher 记录（兑换码只落在凭证表）
    #[instrument(skip(self, notes), fields(request_id = id, reviewer = %reviewer))]
    pub async fn review_request(
        &self,
        id: i64,
        decision: ReviewDecision,
        reviewer: Uuid,
        notes: Option<String>,
    ) -> Result<VoucherRequest> {
        let request = self
            .repo
            .get_request(id)
            .await?
            .ok_or(VoucherError::VoucherRequestNotFound(id))?;

        if request.status.is_terminal() {
            return Err(VoucherError::InvalidStatusTransition {
                entity: "voucher_request",
                id,
                from: request.status.as_str().to_string(),
                to: match decision {
                    ReviewDecision::Approve => "approved".to_string(),
                    ReviewDecision::Reject => "rejected".to_string(),
                },
            });
        }

        match decision {
            ReviewDecision::Approve => {
                let issued = self
                    .issuance
                    .issue_for_request(&request, reviewer, notes.as_deref())
                    .await?;

                info!(request_id = id, voucher_id = issued.voucher_id, "拨款申请已批准");
                self.notifier
                    .voucher_request_reviewed(&request, Some(&issued.voucher_code))
                    .await;
            }
            ReviewDecision::Reject => {
                let updated = self
                    .repo
                    .reject_request(id, reviewer, notes.as_deref())
                    .await?;
                if updated == 0 {
                    return Err(VoucherError::InvalidStatusTransition {
                        entity: "voucher_request",
                        id,
                        from: "non-pending".to_string(),
                        to: "rejected".to_string(),
                    });
                }

                info!(request_id = id, "拨款申请已拒绝");
                self.notifier.voucher_request_reviewed(&request, None).await;
            }
        }

        self.repo
            .get_request(id)
            .await?
            .ok_or(VoucherError::VoucherRequestNotFound(id))
    }
}
