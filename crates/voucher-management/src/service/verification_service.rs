//! 兑换码核验服务
//!
//! 对商户提交的兑换码做只读分类，查找顺序固定且不可调换：
//!
//! 1. 申请表精确匹配（奖学金类兑换码的权威来源）
//! 2. 凭证表精确匹配（覆盖拨款申请产生的兑换码）
//! 3. 两张表的忽略大小写兜底查询（旧数据可能存有小写码）
//!
//! 首个决定性命中即返回，不再继续向后查找。存储不可达时返回
//! Err（数据库错误），调用方必须将其与 not_found 区分开。

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::code::normalize_code;
use crate::error::{Result, VoucherError};
use crate::models::{ReviewStatus, VerificationStatus, VoucherStatus};
use crate::repository::traits::VerificationStore;

/// 核验通过时返回的凭证元数据
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidVoucher {
    /// 命中的申请 ID；仅凭证表命中且无对应申请时为凭证 ID
    pub application_id: i64,
    pub student_name: Option<String>,
    pub school_name: Option<String>,
    pub voucher_amount: Option<i64>,
    /// 命中记录的状态（approved 或 active）
    pub status: String,
}

/// 核验结果分类
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    /// 有效：命中已批准的申请或有效凭证
    Valid(ValidVoucher),
    /// 无效：码存在但不处于可核销状态
    Invalid { reason: String, status: String },
    /// 两张表中均未找到
    NotFound,
}

impl VerificationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// 映射为提交记录中持久化的核验状态
    pub fn verification_status(&self) -> VerificationStatus {
        match self {
            Self::Valid(_) => VerificationStatus::Valid,
            Self::Invalid { .. } => VerificationStatus::Invalid,
            Self::NotFound => VerificationStatus::NotFound,
        }
    }

    /// 命中的申请 ID（如有）
    pub fn matched_application_id(&self) -> Option<i64> {
        match self {
            Self::Valid(valid) => Some(valid.application_id),
            _ => None,
        }
    }
}

/// 兑换码核验服务
///
/// 全部操作只读；提交流程负责将分类结果持久化为提交记录。
pub struct VerificationService {
    store: Arc<dyn VerificationStore>,
}

impl VerificationService {
    pub fn new(store: Arc<dyn VerificationStore>) -> Self {
        Self { store }
    }

    /// 核验一个用户输入的兑换码
    ///
    /// 输入先做规范化（去空白 + 大写），同一个码的不同写法得到
    /// 相同结果。空输入按参数错误处理，不触发任何查询。
    #[instrument(skip(self, raw_code))]
    pub async fn verify(&self, raw_code: &str) -> Result<VerificationOutcome> {
        let code = normalize_code(raw_code);
        if code.is_empty() {
            return Err(VoucherError::Validation("兑换码不能为空".to_string()));
        }

        // 1. 申请表精确匹配：已批准的记录优先
        let applications = self.store.applications_by_code(&code).await?;
        if let Some(approved) = applications
            .iter()
            .find(|a| a.status == ReviewStatus::Approved)
        {
            info!(voucher_code = %code, application_id = approved.id, "核验命中已批准申请");
            return Ok(VerificationOutcome::Valid(ValidVoucher {
                application_id: approved.id,
                student_name: Some(approved.student_name.clone()),
                school_name: Some(approved.school_name.clone()),
                voucher_amount: approved.voucher_amount,
                status: ReviewStatus::Approved.as_str().to_string(),
            }));
        }
        if let Some(first) = applications.first() {
            return Ok(VerificationOutcome::Invalid {
                reason: "Voucher code is not approved yet".to_string(),
                status: first.status.as_str().to_string(),
            });
        }

        // 2. 凭证表精确匹配
        let vouchers = self.store.vouchers_by_code(&code).await?;
        if let Some(voucher) = vouchers.first() {
            if voucher.status == VoucherStatus::Active {
                // 回查对应的已批准申请，拿到规范的申请 ID
                let application_id = self
                    .store
                    .approved_application_id_by_code(&code)
                    .await?
                    .unwrap_or(voucher.id);

                info!(voucher_code = %code, voucher_id = voucher.id, "核验命中有效凭证");
                return Ok(VerificationOutcome::Valid(ValidVoucher {
                    application_id,
                    student_name: None,
                    school_name: None,
                    voucher_amount: Some(voucher.amount),
                    status: VoucherStatus::Active.as_str().to_string(),
                }));
            }
            return Ok(VerificationOutcome::Invalid {
                reason: "Voucher code is not active".to_string(),
                status: voucher.status.as_str().to_string(),
            });
        }

        // 3. 忽略大小写兜底：旧系统迁移的数据可能存有非大写兑换码
        if let Some(voucher) = self.store.voucher_by_code_case_insensitive(&code).await? {
            if voucher.status == VoucherStatus::Active {
                return Ok(VerificationOutcome::Valid(ValidVoucher {
                    application_id: voucher.id,
                    student_name: None,
                    school_name: None,
                    voucher_amount: Some(voucher.amount),
                    status: VoucherStatus::Active.as_str().to_string(),
                }));
            }
        }
        if let Some(application) = self
            .store
            .application_by_code_case_insensitive(&code)
            .await?
        {
            if application.status == ReviewStatus::Approved {
                return Ok(VerificationOutcome::Valid(ValidVoucher {
                    application_id: application.id,
                    student_name: Some(application.student_name.clone()),
                    school_name: Some(application.school_name.clone()),
                    voucher_amount: application.voucher_amount,
                    status: ReviewStatus::Approved.as_str().to_string(),
                }));
            }
        }

        info!(voucher_code = %code, "核验未找到兑换码");
        Ok(VerificationOutcome::NotFound)
    }
}
