//! VerificationService 集成测试
//!
//! 使用可编程的内存假存储验证核验分类的全部边界：
//! 申请表优先于凭证表（首个决定性命中即停止查找）、pending 归类为
//! invalid 而非 not_found、输入规范化幂等、存储故障与 not_found 可区分。

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use voucher_management::error::{Result, VoucherError};
use voucher_management::models::{
    ReviewStatus, ScholarshipApplication, Voucher, VoucherStatus,
};
use voucher_management::repository::traits::VerificationStore;
use voucher_management::service::{VerificationOutcome, VerificationService};

// ==================== 可编程假存储 ====================

/// 固定数据集 + 调用计数的核验存储
#[derive(Default)]
struct ScriptedStore {
    applications: Vec<ScholarshipApplication>,
    vouchers: Vec<Voucher>,
    /// 所有查询返回数据库错误（模拟存储不可达）
    unreachable: bool,
    application_queries: AtomicU32,
    voucher_queries: AtomicU32,
}

impl ScriptedStore {
    fn failing() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable {
            return Err(VoucherError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl VerificationStore for ScriptedStore {
    async fn applications_by_code(&self, code: &str) -> Result<Vec<ScholarshipApplication>> {
        self.check_reachable()?;
        self.application_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .applications
            .iter()
            .filter(|a| a.voucher_code.as_deref() == Some(code))
            .cloned()
            .collect())
    }

    async fn vouchers_by_code(&self, code: &str) -> Result<Vec<Voucher>> {
        self.check_reachable()?;
        self.voucher_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .vouchers
            .iter()
            .filter(|v| v.voucher_code == code)
            .cloned()
            .collect())
    }

    async fn application_by_code_case_insensitive(
        &self,
        code: &str,
    ) -> Result<Option<ScholarshipApplication>> {
        self.check_reachable()?;
        Ok(self
            .applications
            .iter()
            .find(|a| {
                a.voucher_code
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(code))
            })
            .cloned())
    }

    async fn voucher_by_code_case_insensitive(&self, code: &str) -> Result<Option<Voucher>> {
        self.check_reachable()?;
        Ok(self
            .vouchers
            .iter()
            .find(|v| v.voucher_code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn approved_application_id_by_code(&self, code: &str) -> Result<Option<i64>> {
        self.check_reachable()?;
        Ok(self
            .applications
            .iter()
            .find(|a| {
                a.voucher_code.as_deref() == Some(code) && a.status == ReviewStatus::Approved
            })
            .map(|a| a.id))
    }
}

// ==================== 辅助函数 ====================

fn make_application(
    id: i64,
    code: &str,
    status: ReviewStatus,
    amount: Option<i64>,
) -> ScholarshipApplication {
    ScholarshipApplication {
        id,
        student_name: "Amara Osei".to_string(),
        email: "school@example.org".to_string(),
        phone: None,
        school_name: "Riverside Academy".to_string(),
        district: None,
        grade_level: None,
        program_type: "STEM Program".to_string(),
        financial_need_description: None,
        academic_goals: None,
        student_count: 1,
        voucher_amount: amount,
        voucher_code: Some(code.to_string()),
        country: "US".to_string(),
        status,
        applied_date: Utc::now(),
        reviewed_by: None,
        reviewed_at: None,
        notes: None,
        school_user_id: Uuid::new_v4(),
    }
}

fn make_voucher(id: i64, code: &str, status: VoucherStatus, amount: i64) -> Voucher {
    Voucher {
        id,
        voucher_code: code.to_string(),
        school_id: Uuid::new_v4(),
        amount,
        purpose: "STEM Program".to_string(),
        status,
        created_by: Uuid::new_v4(),
        application_id: None,
        request_id: Some(1),
        expires_at: None,
        used_at: None,
        created_at: Utc::now(),
    }
}

fn service(store: ScriptedStore) -> (VerificationService, Arc<ScriptedStore>) {
    let store = Arc::new(store);
    (VerificationService::new(store.clone()), store)
}

// ==================== 测试 ====================

/// 同一个码同时存在于申请表（approved、500）和凭证表（active、900）时，
/// 返回申请表的元数据且不再查询凭证表
#[tokio::test]
async fn application_table_wins_over_voucher_table() {
    let (service, store) = service(ScriptedStore {
        applications: vec![make_application(
            4,
            "GBF-AB3X-9Q7K",
            ReviewStatus::Approved,
            Some(500),
        )],
        vouchers: vec![make_voucher(9, "GBF-AB3X-9Q7K", VoucherStatus::Active, 900)],
        ..ScriptedStore::default()
    });

    let outcome = service.verify("GBF-AB3X-9Q7K").await.unwrap();

    match outcome {
        VerificationOutcome::Valid(valid) => {
            assert_eq!(valid.application_id, 4);
            assert_eq!(valid.voucher_amount, Some(500), "必须取申请表金额");
            assert_eq!(valid.status, "approved");
            assert_eq!(valid.student_name.as_deref(), Some("Amara Osei"));
        }
        other => panic!("期望核验通过，实际: {other:?}"),
    }

    // 首个决定性命中即停止，凭证表不应被查询
    assert_eq!(store.voucher_queries.load(Ordering::SeqCst), 0);
}

/// 仅存在 pending 申请的码归类为 invalid（附未批准原因），而非 not_found
#[tokio::test]
async fn pending_application_classifies_as_invalid() {
    let (service, _store) = service(ScriptedStore {
        applications: vec![make_application(
            4,
            "GBF-AB3X-9Q7K",
            ReviewStatus::Pending,
            Some(500),
        )],
        ..ScriptedStore::default()
    });

    let outcome = service.verify("GBF-AB3X-9Q7K").await.unwrap();

    match outcome {
        VerificationOutcome::Invalid { reason, status } => {
            assert!(reason.contains("not approved"));
            assert_eq!(status, "pending");
        }
        other => panic!("期望 invalid，实际: {other:?}"),
    }
}

/// 凭证表命中但状态非 active 时归类为 invalid
#[tokio::test]
async fn non_active_voucher_classifies_as_invalid() {
    let (service, _store) = service(ScriptedStore {
        vouchers: vec![make_voucher(9, "GBF-W2YM-K4PD", VoucherStatus::Used, 300)],
        ..ScriptedStore::default()
    });

    let outcome = service.verify("GBF-W2YM-K4PD").await.unwrap();

    match outcome {
        VerificationOutcome::Invalid { reason, status } => {
            assert!(reason.contains("not active"));
            assert_eq!(status, "used");
        }
        other => panic!("期望 invalid，实际: {other:?}"),
    }
}

/// 凭证表命中 active 时回查已批准申请拿规范申请 ID
#[tokio::test]
async fn active_voucher_cross_checks_application_id() {
    let mut application =
        make_application(4, "GBF-W2YM-K4PD", ReviewStatus::Approved, Some(300));
    // 申请表的精确查询只对 voucher_code 命中，本用例模拟码只在
    // 凭证表、申请表通过回查补出 ID 的场景
    application.voucher_code = None;

    let (service, _store) = service(ScriptedStore {
        applications: vec![application],
        vouchers: vec![make_voucher(9, "GBF-W2YM-K4PD", VoucherStatus::Active, 300)],
        ..ScriptedStore::default()
    });

    let outcome = service.verify("GBF-W2YM-K4PD").await.unwrap();

    match outcome {
        VerificationOutcome::Valid(valid) => {
            // 无对应申请时回退为凭证 ID
            assert_eq!(valid.application_id, 9);
            assert_eq!(valid.voucher_amount, Some(300));
            assert_eq!(valid.status, "active");
        }
        other => panic!("期望核验通过，实际: {other:?}"),
    }
}

/// 规范化幂等：加空白的小写输入与规范大写输入得到相同结果
#[tokio::test]
async fn normalization_is_idempotent() {
    let (service, _store) = service(ScriptedStore {
        applications: vec![make_application(
            4,
            "GBF-AB3X-9Q7K",
            ReviewStatus::Approved,
            Some(500),
        )],
        ..ScriptedStore::default()
    });

    let raw = service.verify(" gbf-ab3x-9q7k ").await.unwrap();
    let normalized = service.verify("GBF-AB3X-9Q7K").await.unwrap();

    assert_eq!(raw, normalized);
    assert!(raw.is_valid());
}

/// 两张表均未命中时返回 not_found
#[tokio::test]
async fn unknown_code_is_not_found() {
    let (service, _store) = service(ScriptedStore::default());

    let outcome = service.verify("GBF-AB3X-9Q7K").await.unwrap();
    assert_eq!(outcome, VerificationOutcome::NotFound);
    assert_eq!(
        outcome.verification_status(),
        voucher_management::models::VerificationStatus::NotFound
    );
}

/// 旧数据中非大写存储的码通过忽略大小写兜底命中
#[tokio::test]
async fn legacy_lowercase_code_is_found_by_fallback() {
    let (service, _store) = service(ScriptedStore {
        vouchers: vec![make_voucher(9, "gbf-w2ym-k4pd", VoucherStatus::Active, 300)],
        ..ScriptedStore::default()
    });

    let outcome = service.verify("GBF-W2YM-K4PD").await.unwrap();

    match outcome {
        VerificationOutcome::Valid(valid) => {
            assert_eq!(valid.application_id, 9);
            assert_eq!(valid.status, "active");
        }
        other => panic!("期望核验通过，实际: {other:?}"),
    }
}

/// 存储不可达返回 Err 而不是 not_found，两者必须可区分
#[tokio::test]
async fn store_failure_is_distinguishable_from_not_found() {
    let (service, _store) = service(ScriptedStore::failing());

    let err = service
        .verify("GBF-AB3X-9Q7K")
        .await
        .expect_err("存储故障必须向上传播");

    assert!(matches!(err, VoucherError::Database(_)));
    assert!(err.is_retryable());
}

/// 空输入按参数错误处理，不触发任何查询
#[tokio::test]
async fn blank_code_is_a_validation_error() {
    let (service, store) = service(ScriptedStore::default());

    let err = service.verify("   ").await.expect_err("空码应报参数错误");
    assert!(matches!(err, VoucherError::Validation(_)));
    assert_eq!(store.application_queries.load(Ordering::SeqCst), 0);
    assert_eq!(store.voucher_queries.load(Ordering::SeqCst), 0);
}
