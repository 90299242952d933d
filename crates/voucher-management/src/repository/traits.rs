//! 仓储 Trait 定义
//!
//! 定义发放与核验流程依赖的存储接口，便于服务层依赖抽象而非
//! 具体实现，支持 mock 测试

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ScholarshipApplication, Voucher};

/// 批准奖学金申请的写入参数
///
/// 申请状态更新与凭证投影插入必须在同一事务中提交
#[derive(Debug, Clone)]
pub struct ApplicationApproval {
    pub application_id: i64,
    /// 申请所属学校账号（凭证归属方）
    pub school_id: Uuid,
    pub amount: i64,
    pub purpose: String,
    pub voucher_code: String,
    pub reviewer: Uuid,
    pub notes: Option<String>,
}

/// 批准拨款申请的写入参数
#[derive(Debug, Clone)]
pub struct RequestApproval {
    pub request_id: i64,
    pub school_id: Uuid,
    pub amount: i64,
    pub purpose: String,
    pub voucher_code: String,
    pub reviewer: Uuid,
    pub notes: Option<String>,
}

/// 发放流程的存储接口
///
/// 实现方必须保证两点：code_exists 覆盖所有持码表；commit 写入命中
/// 唯一约束时返回 VoucherError::CodeConflict（而非底层数据库错误），
/// 发放循环据此换新候选码重试。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssuanceStore: Send + Sync {
    /// 探测候选码是否已被任一持码表占用（只读）
    async fn code_exists(&self, code: &str) -> Result<bool>;

    /// 在单个事务中将申请置为 approved、写入兑换码并插入凭证投影，
    /// 返回新凭证 ID
    async fn commit_application_approval(&self, approval: &ApplicationApproval) -> Result<i64>;

    /// 在单个事务中将拨款申请置为 approved 并插入凭证记录，
    /// 返回新凭证 ID
    async fn commit_request_approval(&self, approval: &RequestApproval) -> Result<i64>;
}

/// 核验流程的存储接口（全部只读）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// 按兑换码精确查找奖学金申请
    async fn applications_by_code(&self, code: &str) -> Result<Vec<ScholarshipApplication>>;

    /// 按兑换码精确查找凭证记录
    async fn vouchers_by_code(&self, code: &str) -> Result<Vec<Voucher>>;

    /// 忽略大小写查找奖学金申请（最后的兜底查询）
    async fn application_by_code_case_insensitive(
        &self,
        code: &str,
    ) -> Result<Option<ScholarshipApplication>>;

    /// 忽略大小写查找凭证记录（最后的兜底查询）
    async fn voucher_by_code_case_insensitive(&self, code: &str) -> Result<Option<Voucher>>;

    /// 查找持有该码且已批准的申请 ID（凭证命中时回查申请）
    async fn approved_application_id_by_code(&self, code: &str) -> Result<Option<i64>>;
}
