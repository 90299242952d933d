//! 兑换码发放服务
//!
//! 负责在批准申请时生成全局唯一的兑换码并落库，流程：
//!
//! 1. 生成候选码 -> 2. 跨持码表探测占用 -> 3. 单事务写入
//!    -> 命中唯一约束视为并发抢占，换码重试（上限 10 次）
//!
//! 探测只是省掉注定失败事务的快速路径；真正的唯一性保证是
//! 两张持码表上的唯一约束。重试耗尽时整个审批操作失败，
//! 不会留下任何半写入记录。

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::code::{DEFAULT_CODE_PREFIX, generate_code};
use crate::error::{Result, VoucherError};
use crate::models::{ScholarshipApplication, VoucherRequest};
use crate::repository::traits::{ApplicationApproval, IssuanceStore, RequestApproval};

/// 单次发放允许的最大候选码尝试次数
pub const MAX_CODE_ATTEMPTS: u32 = 10;

/// 发放结果
#[derive(Debug, Clone)]
pub struct IssuedVoucher {
    /// 新凭证记录 ID
    pub voucher_id: i64,
    /// 发放的兑换码
    pub voucher_code: String,
}

/// 兑换码发放服务
pub struct IssuanceService {
    store: Arc<dyn IssuanceStore>,
    prefix: String,
}

impl IssuanceService {
    pub fn new(store: Arc<dyn IssuanceStore>) -> Self {
        Self::with_prefix(store, DEFAULT_CODE_PREFIX)
    }

    /// 使用自定义前缀创建（前缀须为 3 位大写字母）
    pub fn with_prefix(store: Arc<dyn IssuanceStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// 批准奖学金申请并发放兑换码
    ///
    /// 申请必须带有金额；状态更新与凭证投影在同一事务中提交。
    #[instrument(skip(self, application, notes), fields(application_id = application.id))]
    pub async fn issue_for_application(
        &self,
        application: &ScholarshipApplication,
        reviewer: Uuid,
        notes: Option<&str>,
    ) -> Result<IssuedVoucher> {
        let amount = application.voucher_amount.ok_or_else(|| {
            VoucherError::Validation(format!(
                "申请未填写金额，无法发放兑换码: application_id={}",
                application.id
            ))
        })?;

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let candidate = generate_code(&self.prefix);

            // 快速路径：已占用的候选码直接跳过，省一次注定失败的事务
            if self.store.code_exists(&candidate).await? {
                debug!(attempt, "候选码已被占用，重新生成");
                continue;
            }

            let approval = ApplicationApproval {
                application_id: application.id,
                school_id: application.school_user_id,
                amount,
                purpose: application.program_type.clone(),
                voucher_code: candidate.clone(),
                reviewer,
                notes: notes.map(|s| s.to_string()),
            };

            match self.store.commit_application_approval(&approval).await {
                Ok(voucher_id) => {
                    info!(attempt, voucher_id, voucher_code = %candidate, "兑换码发放成功");
                    return Ok(IssuedVoucher {
                        voucher_id,
                        voucher_code: candidate,
                    });
                }
                // 探测与提交之间被并发占用，换新候选码继续
                Err(VoucherError::CodeConflict(code)) => {
                    warn!(attempt, voucher_code = %code, "提交时兑换码冲突，换码重试");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(VoucherError::CodeGenerationExhausted {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }

    /// 批准拨款申请并发放兑换码
    ///
    /// 兑换码只落在凭证表（拨款申请本身不持码）
    #[instrument(skip(self, request, notes), fields(request_id = request.id))]
    pub async fn issue_for_request(
        &self,
        request: &VoucherRequest,
        reviewer: Uuid,
        notes: Option<&str>,
    ) -> Result<IssuedVoucher> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let candidate = generate_code(&self.prefix);

            if self.store.code_exists(&candidate).await? {
                debug!(attempt, "候选码已被占用，重新生成");
                continue;
            }

            let approval = RequestApproval {
                request_id: request.id,
                school_id: request.school_user_id,
                amount: request.amount,
                purpose: request.purpose.clone(),
                voucher_code: candidate.clone(),
                reviewer,
                notes: notes.map(|s| s.to_string()),
            };

            match self.store.commit_request_approval(&approval).await {
                Ok(voucher_id) => {
                    info!(attempt, voucher_id, voucher_code = %candidate, "兑换码发放成功");
                    return Ok(IssuedVoucher {
                        voucher_id,
                        voucher_code: candidate,
                    });
                }
                Err(VoucherError::CodeConflict(code)) => {
                    warn!(attempt, voucher_code = %code, "提交时兑换码冲突，换码重试");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(VoucherError::CodeGenerationExhausted {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }
}
