//! 注册审核服务
//!
//! 学校与商户注册记录的创建和管理员审核流转，审核结果触发
//! 尽力而为的邮件通知。

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{Result, VoucherError};
use crate::models::{
    NewSchoolSignup, NewVendorSignup, SchoolSignup, SchoolSignupStatus, VendorSignup,
    VendorSignupStatus,
};
use crate::notification::Notifier;
use crate::repository::SignupRepository;
use crate::service::dto::SchoolReviewAction;

/// 注册审核服务
pub struct SignupService {
    repo: Arc<SignupRepository>,
    notifier: Arc<Notifier>,
}

impl SignupService {
    pub fn new(repo: Arc<SignupRepository>, notifier: Arc<Notifier>) -> Self {
        Self { repo, notifier }
    }

    // ==================== 学校注册 ====================

    /// 登记学校注册记录（注册账号创建后调用）
    pub async fn register_school(&self, input: NewSchoolSignup) -> Result<SchoolSignup> {
        let id = self.repo.create_school_signup(&input).await?;
        info!(signup_id = id, user_id = %input.user_id, "学校注册记录已创建");

        self.repo
            .get_school_signup(id)
            .await?
            .ok_or(VoucherError::SchoolSignupNotFound(id))
    }

    /// 查询某账号的学校注册记录
    pub async fn school_signup_by_user(&self, user_id: Uuid) -> Result<Option<SchoolSignup>> {
        self.repo.get_school_signup_by_user(user_id).await
    }

    /// 列出学校注册记录（可按状态过滤）
    pub async fn list_school_signups(
        &self,
        status: Option<SchoolSignupStatus>,
    ) -> Result<Vec<SchoolSignup>> {
        self.repo.list_school_signups(status).await
    }

    /// 审核学校注册
    ///
    /// pending 可批准/拒绝/转候补，候补可再批准/拒绝；终态拒绝重复审核
    #[instrument(skip(self, notes), fields(signup_id = id, reviewer = %reviewer))]
    pub async fn review_school_signup(
        &self,
        id: i64,
        action: SchoolReviewAction,
        reviewer: Uuid,
        notes: Option<String>,
    ) -> Result<SchoolSignup> {
        let signup = self
            .repo
            .get_school_signup(id)
            .await?
            .ok_or(VoucherError::SchoolSignupNotFound(id))?;

        let target = match action {
            SchoolReviewAction::Approve => SchoolSignupStatus::Approved,
            SchoolReviewAction::Reject => SchoolSignupStatus::Rejected,
            SchoolReviewAction::Waitlist => SchoolSignupStatus::Waitlisted,
        };

        if !signup.status.can_transition_to(target) {
            return Err(VoucherError::InvalidStatusTransition {
                entity: "school_signup",
                id,
                from: signup.status.as_str().to_string(),
                to: target.as_str().to_string(),
            });
        }

        self.repo
            .review_school_signup(id, target, reviewer, notes.as_deref())
            .await?;

        info!(signup_id = id, status = target.as_str(), "学校注册审核完成");

        let refreshed = self
            .repo
            .get_school_signup(id)
            .await?
            .ok_or(VoucherError::SchoolSignupNotFound(id))?;

        self.notifier.school_signup_reviewed(&refreshed).await;

        Ok(refreshed)
    }

    // ==================== 商户注册 ====================

    /// 登记商户注册记录
    pub async fn register_vendor(&self, input: NewVendorSignup) -> Result<VendorSignup> {
        let id = self.repo.create_vendor_signup(&input).await?;
        info!(signup_id = id, user_id = %input.user_id, "商户注册记录已创建");

        self.repo
            .get_vendor_signup(id)
            .await?
            .ok_or(VoucherError::VendorSignupNotFound(id))
    }

    /// 查询某账号的商户注册记录
    pub async fn vendor_signup_by_user(&self, user_id: Uuid) -> Result<Option<VendorSignup>> {
        self.repo.get_vendor_signup_by_user(user_id).await
    }

    /// 列出商户注册记录（可按状态过滤）
    pub async fn list_vendor_signups(
        &self,
        status: Option<VendorSignupStatus>,
    ) -> Result<Vec<VendorSignup>> {
        self.repo.list_vendor_signups(status).await
    }

    /// 审核商户注册
    ///
    /// 目标状态必须是当前状态的合法流转；risk_flag 为空时保持原值
    #[instrument(skip(self, notes), fields(signup_id = id, reviewer = %reviewer))]
    pub async fn review_vendor_signup(
        &self,
        id: i64,
        target: VendorSignupStatus,
        risk_flag: Option<bool>,
        reviewer: Uuid,
        notes: Option<String>,
    ) -> Result<VendorSignup> {
        let signup = self
            .repo
            .get_vendor_signup(id)
            .await?
            .ok_or(VoucherError::VendorSignupNotFound(id))?;

        if !signup.status.can_transition_to(target) {
            return Err(VoucherError::InvalidStatusTransition {
                entity: "vendor_signup",
                id,
                from: signup.status.as_str().to_string(),
                to: target.as_str().to_string(),
            });
        }

        let risk_flag = risk_flag.unwrap_or(signup.risk_flag);

        self.repo
            .review_vendor_signup(id, target, risk_flag, reviewer, notes.as_deref())
            .await?;

        info!(
            signup_id = id,
            status = target.as_str(),
            risk_flag,
            "商户注册审核完成"
        );

        let refreshed = self
            .repo
            .get_vendor_signup(id)
            .await?
            .ok_or(VoucherError::VendorSignupNotFound(id))?;

        self.notifier.vendor_signup_reviewed(&refreshed).await;

        Ok(refreshed)
    }
}
