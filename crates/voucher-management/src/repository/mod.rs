//! 数据访问层
//!
//! 每个聚合一个仓储，内部使用 sqlx 原生 SQL；事务内操作提供
//! `_in_tx` 静态方法。traits 模块定义发放与核验流程依赖的
//! 存储抽象，便于服务层 mock 测试。

pub mod application_repo;
pub mod signup_repo;
pub mod stores;
pub mod submission_repo;
pub mod traits;
pub mod voucher_repo;

pub use application_repo::ApplicationRepository;
pub use signup_repo::SignupRepository;
pub use stores::{PgIssuanceStore, PgVerificationStore};
pub use submission_repo::SubmissionRepository;
pub use traits::{ApplicationApproval, IssuanceStore, RequestApproval, VerificationStore};
pub use voucher_repo::VoucherRepository;
