//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use sqlx::PgPool;
use std::sync::Arc;

use voucher_management::{
    ApplicationService, ReconcileService, SignupService, SubmissionService, VerificationService,
    VoucherRepository,
};

use crate::auth::JwtManager;

/// Axum 应用共享状态
///
/// 包含数据库连接池、JWT 管理器和各业务服务，通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL 连接池（认证查库等处理器内直查使用）
    pub pool: PgPool,
    /// JWT 管理器
    pub jwt_manager: JwtManager,
    /// 注册审核服务
    pub signups: Arc<SignupService>,
    /// 申请审批服务（含拨款申请）
    pub applications: Arc<ApplicationService>,
    /// 商户提交服务
    pub submissions: Arc<SubmissionService>,
    /// 兑换码核验服务
    pub verification: Arc<VerificationService>,
    /// 凭证仓储（列表/作废）
    pub vouchers: Arc<VoucherRepository>,
    /// 兑换码一致性检查服务
    pub reconcile: Arc<ReconcileService>,
}

#[allow(clippy::too_many_arguments)]
impl AppState {
    /// 创建新的应用状态
    pub fn new(
        pool: PgPool,
        jwt_manager: JwtManager,
        signups: Arc<SignupService>,
        applications: Arc<ApplicationService>,
        submissions: Arc<SubmissionService>,
        verification: Arc<VerificationService>,
        vouchers: Arc<VoucherRepository>,
        reconcile: Arc<ReconcileService>,
    ) -> Self {
        Self {
            pool,
            jwt_manager,
            signups,
            applications,
            submissions,
            verification,
            vouchers,
            reconcile,
        }
    }
}
