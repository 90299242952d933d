//! 凭证服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use thiserror::Error;

/// 凭证服务错误类型
#[derive(Debug, Error)]
pub enum VoucherError {
    // === 注册审核相关错误 ===
    #[error("学校注册记录不存在: {0}")]
    SchoolSignupNotFound(i64),

    #[error("商户注册记录不存在: {0}")]
    VendorSignupNotFound(i64),

    // === 申请相关错误 ===
    #[error("奖学金申请不存在: {0}")]
    ApplicationNotFound(i64),

    #[error("拨款申请不存在: {0}")]
    VoucherRequestNotFound(i64),

    // === 凭证相关错误 ===
    #[error("兑换凭证不存在: {0}")]
    VoucherNotFound(i64),

    #[error("兑换凭证状态不允许此操作: voucher_id={id}, current_status={status}")]
    VoucherNotActive { id: i64, status: String },

    #[error("生成唯一兑换码失败: 已尝试 {attempts} 次")]
    CodeGenerationExhausted { attempts: u32 },

    #[error("兑换码已被占用: {0}")]
    CodeConflict(String),

    // === 商户提交相关错误 ===
    #[error("兑换码提交记录不存在: {0}")]
    SubmissionNotFound(i64),

    // === 状态流转错误 ===
    #[error("状态不允许此操作: {entity} id={id}, {from} -> {to}")]
    InvalidStatusTransition {
        entity: &'static str,
        id: i64,
        from: String,
        to: String,
    },

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 凭证服务 Result 类型别名
pub type Result<T> = std::result::Result<T, VoucherError>;

impl VoucherError {
    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::CodeConflict(_))
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Serialization(_) | Self::Internal(_)
        )
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SchoolSignupNotFound(_) => "SCHOOL_SIGNUP_NOT_FOUND",
            Self::VendorSignupNotFound(_) => "VENDOR_SIGNUP_NOT_FOUND",
            Self::ApplicationNotFound(_) => "APPLICATION_NOT_FOUND",
            Self::VoucherRequestNotFound(_) => "VOUCHER_REQUEST_NOT_FOUND",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::VoucherNotActive { .. } => "VOUCHER_NOT_ACTIVE",
            Self::CodeGenerationExhausted { .. } => "CODE_GENERATION_EXHAUSTED",
            Self::CodeConflict(_) => "CODE_CONFLICT",
            Self::SubmissionNotFound(_) => "SUBMISSION_NOT_FOUND",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// 判断 sqlx 错误是否为唯一约束冲突（PostgreSQL 23505）
///
/// 发放流程以唯一约束作为兑换码全局唯一的最终保证，
/// 提交事务时命中 23505 说明候选码在探测与写入之间被并发占用。
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}
