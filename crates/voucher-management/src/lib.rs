//! 奖学金兑换凭证管理核心库
//!
//! 包含兑换码生成与发放、兑换码核验、注册/申请/提交记录的审核流转，
//! 以及审核结果的邮件通知。REST 接口层见 voucher-admin-service。

pub mod code;
pub mod error;
pub mod models;
pub mod notification;
pub mod repository;
pub mod service;

// 重新导出常用类型
pub use error::{Result, VoucherError};
pub use repository::{
    ApplicationRepository, PgIssuanceStore, PgVerificationStore, SignupRepository,
    SubmissionRepository, VoucherRepository,
};
pub use service::{
    ApplicationService, IssuanceService, ReconcileService, SignupService, SubmissionService,
    VerificationService,
};
