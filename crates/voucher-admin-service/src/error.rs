//! 管理后台错误类型定义
//!
//! 包含所有 admin service 特有的错误类型

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use voucher_management::VoucherError;

/// 管理后台错误类型
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("禁止访问: {0}")]
    Forbidden(String),
    #[error("邮箱或密码错误")]
    InvalidCredentials,
    #[error("账号已被禁用")]
    UserDisabled,
    #[error("账号已被锁定，请稍后重试")]
    UserLocked,
    #[error("账号不存在: {0}")]
    UserNotFound(String),
    #[error("邮箱已被注册: {0}")]
    EmailAlreadyRegistered(String),

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 资源不存在
    #[error("学校注册记录不存在: {0}")]
    SchoolSignupNotFound(i64),
    #[error("商户注册记录不存在: {0}")]
    VendorSignupNotFound(i64),
    #[error("奖学金申请不存在: {0}")]
    ApplicationNotFound(i64),
    #[error("拨款申请不存在: {0}")]
    VoucherRequestNotFound(i64),
    #[error("兑换凭证不存在: {0}")]
    VoucherNotFound(i64),
    #[error("兑换码提交记录不存在: {0}")]
    SubmissionNotFound(i64),

    // 业务错误
    #[error("状态不允许此操作: {0}")]
    InvalidStatusTransition(String),
    #[error("生成唯一兑换码失败（已尝试 {0} 次），请重试审批操作")]
    CodeGenerationExhausted(u32),
    #[error("兑换凭证当前状态不可操作: voucher_id={id}, status={status}")]
    VoucherNotActive { id: i64, status: String },

    // 核验基础设施故障（区别于 not_found）
    #[error("核验服务暂不可用: {0}")]
    VerificationUnavailable(String),

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AdminError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) | Self::UserDisabled | Self::UserLocked => StatusCode::FORBIDDEN,
            Self::UserNotFound(_) => StatusCode::NOT_FOUND,

            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::EmailAlreadyRegistered(_) => StatusCode::CONFLICT,

            Self::SchoolSignupNotFound(_)
            | Self::VendorSignupNotFound(_)
            | Self::ApplicationNotFound(_)
            | Self::VoucherRequestNotFound(_)
            | Self::VoucherNotFound(_)
            | Self::SubmissionNotFound(_) => StatusCode::NOT_FOUND,

            Self::InvalidStatusTransition(_)
            | Self::CodeGenerationExhausted(_)
            | Self::VoucherNotActive { .. } => StatusCode::CONFLICT,

            Self::VerificationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,

            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UserDisabled => "USER_DISABLED",
            Self::UserLocked => "USER_LOCKED",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::EmailAlreadyRegistered(_) => "EMAIL_ALREADY_REGISTERED",

            Self::Validation(_) => "VALIDATION_ERROR",

            Self::SchoolSignupNotFound(_) => "SCHOOL_SIGNUP_NOT_FOUND",
            Self::VendorSignupNotFound(_) => "VENDOR_SIGNUP_NOT_FOUND",
            Self::ApplicationNotFound(_) => "APPLICATION_NOT_FOUND",
            Self::VoucherRequestNotFound(_) => "VOUCHER_REQUEST_NOT_FOUND",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::SubmissionNotFound(_) => "SUBMISSION_NOT_FOUND",

            Self::InvalidStatusTransition(_) => "INVALID_STATUS_TRANSITION",
            Self::CodeGenerationExhausted(_) => "CODE_GENERATION_EXHAUSTED",
            Self::VoucherNotActive { .. } => "VOUCHER_NOT_ACTIVE",

            Self::VerificationUnavailable(_) => "VERIFICATION_UNAVAILABLE",

            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for AdminError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从 voucher-management 的错误转换
impl From<VoucherError> for AdminError {
    fn from(err: VoucherError) -> Self {
        match err {
            VoucherError::Database(e) => Self::Database(e),
            VoucherError::SchoolSignupNotFound(id) => Self::SchoolSignupNotFound(id),
            VoucherError::VendorSignupNotFound(id) => Self::VendorSignupNotFound(id),
            VoucherError::ApplicationNotFound(id) => Self::ApplicationNotFound(id),
            VoucherError::VoucherRequestNotFound(id) => Self::VoucherRequestNotFound(id),
            VoucherError::VoucherNotFound(id) => Self::VoucherNotFound(id),
            VoucherError::SubmissionNotFound(id) => Self::SubmissionNotFound(id),
            VoucherError::Validation(msg) => Self::Validation(msg),
            VoucherError::CodeGenerationExhausted { attempts } => {
                Self::CodeGenerationExhausted(attempts)
            }
            VoucherError::VoucherNotActive { id, status } => Self::VoucherNotActive { id, status },
            err @ VoucherError::InvalidStatusTransition { .. } => {
                Self::InvalidStatusTransition(err.to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            AdminError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AdminError::ApplicationNotFound(1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AdminError::CodeGenerationExhausted(10).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AdminError::VerificationUnavailable("db down".to_string()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_verification_unavailable_is_distinct_from_not_found() {
        // 核验基础设施故障与"码不存在"必须可区分
        let unavailable = AdminError::VerificationUnavailable("db down".to_string());
        assert_eq!(unavailable.error_code(), "VERIFICATION_UNAVAILABLE");
        assert_ne!(unavailable.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_from_voucher_error_mapped_variants() {
        let err: AdminError = VoucherError::ApplicationNotFound(100).into();
        assert!(matches!(err, AdminError::ApplicationNotFound(100)));

        let err: AdminError = VoucherError::CodeGenerationExhausted { attempts: 10 }.into();
        assert!(matches!(err, AdminError::CodeGenerationExhausted(10)));

        let err: AdminError = VoucherError::Validation("amount must be positive".into()).into();
        match err {
            AdminError::Validation(msg) => assert!(msg.contains("amount")),
            other => panic!("期望 Validation，实际: {other:?}"),
        }
    }

    #[test]
    fn test_from_voucher_error_database_stays_database() {
        let err: AdminError = VoucherError::Database(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, AdminError::Database(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_voucher_error_fallback_to_internal() {
        let err: AdminError = VoucherError::Internal("boom".into()).into();
        match err {
            AdminError::Internal(msg) => assert!(msg.contains("boom")),
            other => panic!("未映射变体应回退到 Internal，实际: {other:?}"),
        }
    }

    #[test]
    fn test_from_validation_errors() {
        use validator::{ValidationError, ValidationErrors};

        let mut errors = ValidationErrors::new();
        let mut field_error = ValidationError::new("length");
        field_error.message = Some("兑换码长度不合法".into());
        errors.add("voucherCode", field_error);

        let admin_error: AdminError = errors.into();
        match &admin_error {
            AdminError::Validation(msg) => {
                assert!(msg.contains("voucherCode"), "转换后应保留字段名: {msg}");
            }
            other => panic!("期望 Validation 变体，实际: {other:?}"),
        }
        assert_eq!(admin_error.status_code(), StatusCode::BAD_REQUEST);
    }
}
