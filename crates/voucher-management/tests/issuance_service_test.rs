//! IssuanceService 集成测试
//!
//! 使用带唯一约束语义的内存假存储验证发放流程的关键性质：
//! 并发发放零碰撞、冲突换码重试、重试上限内无任何半写入。
//! 真实实现中约束由 PostgreSQL 唯一索引提供，假存储在 commit
//! 内部以单锁原子检查模拟同一语义，探测与提交之间保留竞态窗口。

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use voucher_management::code::is_well_formed;
use voucher_management::error::{Result, VoucherError};
use voucher_management::models::{
    ReviewStatus, ScholarshipApplication, Voucher, VoucherStatus,
};
use voucher_management::repository::traits::{
    ApplicationApproval, IssuanceStore, RequestApproval, VerificationStore,
};
use voucher_management::service::{IssuanceService, MAX_CODE_ATTEMPTS, VerificationService};

// ==================== 内存假存储 ====================

#[derive(Default)]
struct StoreState {
    applications: HashMap<i64, ScholarshipApplication>,
    vouchers: Vec<Voucher>,
}

impl StoreState {
    /// 模拟跨两张持码表的占用检查
    fn code_taken(&self, code: &str) -> bool {
        self.applications
            .values()
            .any(|a| a.voucher_code.as_deref() == Some(code))
            || self.vouchers.iter().any(|v| v.voucher_code == code)
    }
}

/// 带唯一约束语义的内存存储
///
/// commit 在单锁内做占用检查后写入（等价于数据库唯一约束）；
/// code_exists 单独加锁，保留真实实现的 check-then-act 竞态窗口。
struct FakeStore {
    state: Mutex<StoreState>,
    /// 探测永远报告已占用（用于重试耗尽场景）
    probe_always_taken: bool,
    /// 注入 N 次提交冲突（模拟探测后被并发抢占）
    conflicts_to_inject: AtomicU32,
    probe_calls: AtomicU32,
    commit_calls: AtomicU32,
}

impl FakeStore {
    fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            probe_always_taken: false,
            conflicts_to_inject: AtomicU32::new(0),
            probe_calls: AtomicU32::new(0),
            commit_calls: AtomicU32::new(0),
        }
    }

    fn with_probe_always_taken() -> Self {
        Self {
            probe_always_taken: true,
            ..Self::new()
        }
    }

    fn with_injected_conflicts(count: u32) -> Self {
        let store = Self::new();
        store.conflicts_to_inject.store(count, Ordering::SeqCst);
        store
    }

    async fn insert_application(&self, application: ScholarshipApplication) {
        let mut state = self.state.lock().await;
        state.applications.insert(application.id, application);
    }

    async fn voucher_count(&self) -> usize {
        self.state.lock().await.vouchers.len()
    }
}

#[async_trait]
impl IssuanceStore for FakeStore {
    async fn code_exists(&self, code: &str) -> Result<bool> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if self.probe_always_taken {
            return Ok(true);
        }
        Ok(self.state.lock().await.code_taken(code))
    }

    async fn commit_application_approval(&self, approval: &ApplicationApproval) -> Result<i64> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);

        if self
            .conflicts_to_inject
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(VoucherError::CodeConflict(approval.voucher_code.clone()));
        }

        let mut state = self.state.lock().await;

        // 唯一约束语义：占用检查与写入在同一临界区内
        if state.code_taken(&approval.voucher_code) {
            return Err(VoucherError::CodeConflict(approval.voucher_code.clone()));
        }

        let application = state
            .applications
            .get_mut(&approval.application_id)
            .ok_or(VoucherError::ApplicationNotFound(approval.application_id))?;
        if application.status != ReviewStatus::Pending {
            return Err(VoucherError::InvalidStatusTransition {
                entity: "scholarship_application",
                id: approval.application_id,
                from: application.status.as_str().to_string(),
                to: "approved".to_string(),
            });
        }

        application.status = ReviewStatus::Approved;
        application.voucher_code = Some(approval.voucher_code.clone());
        application.reviewed_by = Some(approval.reviewer);
        application.reviewed_at = Some(Utc::now());
        application.notes = approval.notes.clone();

        let voucher_id = state.vouchers.len() as i64 + 1;
        state.vouchers.push(Voucher {
            id: voucher_id,
            voucher_code: approval.voucher_code.clone(),
            school_id: approval.school_id,
            amount: approval.amount,
            purpose: approval.purpose.clone(),
            status: VoucherStatus::Active,
            created_by: approval.reviewer,
            application_id: Some(approval.application_id),
            request_id: None,
            expires_at: None,
            used_at: None,
            created_at: Utc::now(),
        });

        Ok(voucher_id)
    }

    async fn commit_request_approval(&self, approval: &RequestApproval) -> Result<i64> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock().await;
        if state.code_taken(&approval.voucher_code) {
            return Err(VoucherError::CodeConflict(approval.voucher_code.clone()));
        }

        let voucher_id = state.vouchers.len() as i64 + 1;
        state.vouchers.push(Voucher {
            id: voucher_id,
            voucher_code: approval.voucher_code.clone(),
            school_id: approval.school_id,
            amount: approval.amount,
            purpose: approval.purpose.clone(),
            status: VoucherStatus::Active,
            created_by: approval.reviewer,
            application_id: None,
            request_id: Some(approval.request_id),
            expires_at: None,
            used_at: None,
            created_at: Utc::now(),
        });

        Ok(voucher_id)
    }
}

#[async_trait]
impl VerificationStore for FakeStore {
    async fn applications_by_code(&self, code: &str) -> Result<Vec<ScholarshipApplication>> {
        let state = self.state.lock().await;
        Ok(state
            .applications
            .values()
            .filter(|a| a.voucher_code.as_deref() == Some(code))
            .cloned()
            .collect())
    }

    async fn vouchers_by_code(&self, code: &str) -> Result<Vec<Voucher>> {
        let state = self.state.lock().await;
        Ok(state
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
        let state = self.state.lock().await;
        Ok(state
            .applications
            .values()
            .find(|a| {
                a.voucher_code
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(code))
            })
            .cloned())
    }

    async fn voucher_by_code_case_insensitive(&self, code: &str) -> Result<Option<Voucher>> {
        let state = self.state.lock().await;
        Ok(state
            .vouchers
            .iter()
            .find(|v| v.voucher_code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn approved_application_id_by_code(&self, code: &str) -> Result<Option<i64>> {
        let state = self.state.lock().await;
        Ok(state
            .applications
            .values()
            .find(|a| {
                a.voucher_code.as_deref() == Some(code) && a.status == ReviewStatus::Approved
            })
            .map(|a| a.id))
    }
}

// ==================== 辅助函数 ====================

fn make_application(id: i64, voucher_amount: Option<i64>) -> ScholarshipApplication {
    ScholarshipApplication {
        id,
        student_name: format!("Student {id}"),
        email: "school@example.org".to_string(),
        phone: None,
        school_name: "Riverside Academy".to_string(),
        district: None,
        grade_level: None,
        program_type: "STEM Program".to_string(),
        financial_need_description: None,
        academic_goals: None,
        student_count: 1,
        voucher_amount,
        voucher_code: None,
        country: "US".to_string(),
        status: ReviewStatus::Pending,
        applied_date: Utc::now(),
        reviewed_by: None,
        reviewed_at: None,
        notes: None,
        school_user_id: Uuid::new_v4(),
    }
}

// ==================== 测试 ====================

/// 并发批准 N 个申请，所有发放的兑换码互不相同且格式合法
#[tokio::test]
async fn concurrent_issuance_produces_no_collisions() {
    const CONCURRENCY: i64 = 32;

    let store = Arc::new(FakeStore::new());
    for id in 1..=CONCURRENCY {
        store.insert_application(make_application(id, Some(100 + id))).await;
    }

    let service = Arc::new(IssuanceService::new(store.clone()));
    let reviewer = Uuid::new_v4();

    let mut handles = Vec::new();
    for id in 1..=CONCURRENCY {
        let service = service.clone();
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let application = store
                .state
                .lock()
                .await
                .applications
                .get(&id)
                .cloned()
                .unwrap();
            service
                .issue_for_application(&application, reviewer, None)
                .await
        }));
    }

    let mut codes = Vec::new();
    for handle in handles {
        let issued = handle.await.unwrap().expect("发放不应失败");
        assert!(is_well_formed(&issued.voucher_code));
        codes.push(issued.voucher_code);
    }

    let mut deduped = codes.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(codes.len(), deduped.len(), "出现重复兑换码: {codes:?}");
    assert_eq!(store.voucher_count().await, CONCURRENCY as usize);
}

/// 探测连续 10 次报告占用时，发放以耗尽错误失败且无任何写入
#[tokio::test]
async fn issuance_fails_after_bounded_retries_without_partial_write() {
    let store = Arc::new(FakeStore::with_probe_always_taken());
    store.insert_application(make_application(1, Some(500))).await;

    let service = IssuanceService::new(store.clone());
    let application = make_application(1, Some(500));

    let err = service
        .issue_for_application(&application, Uuid::new_v4(), None)
        .await
        .expect_err("应以耗尽错误失败");

    assert!(matches!(
        err,
        VoucherError::CodeGenerationExhausted {
            attempts: MAX_CODE_ATTEMPTS
        }
    ));
    assert_eq!(store.probe_calls.load(Ordering::SeqCst), MAX_CODE_ATTEMPTS);
    // 无半写入：从未进入提交阶段，凭证表为空，申请仍为 pending
    assert_eq!(store.commit_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.voucher_count().await, 0);
    let state = store.state.lock().await;
    assert_eq!(state.applications[&1].status, ReviewStatus::Pending);
    assert!(state.applications[&1].voucher_code.is_none());
}

/// 提交阶段的唯一约束冲突触发换码重试，最终发放成功
#[tokio::test]
async fn commit_conflicts_are_retried_with_fresh_codes() {
    let store = Arc::new(FakeStore::with_injected_conflicts(3));
    store.insert_application(make_application(1, Some(500))).await;

    let service = IssuanceService::new(store.clone());
    let application = make_application(1, Some(500));

    let issued = service
        .issue_for_application(&application, Uuid::new_v4(), None)
        .await
        .expect("冲突应被重试消化");

    assert!(is_well_formed(&issued.voucher_code));
    // 3 次注入冲突 + 1 次成功
    assert_eq!(store.commit_calls.load(Ordering::SeqCst), 4);
    assert_eq!(store.voucher_count().await, 1);
}

/// 缺金额的申请不允许发放
#[tokio::test]
async fn issuance_rejects_application_without_amount() {
    let store = Arc::new(FakeStore::new());
    let service = IssuanceService::new(store);

    let application = make_application(1, None);
    let err = service
        .issue_for_application(&application, Uuid::new_v4(), None)
        .await
        .expect_err("缺金额应报参数错误");

    assert!(matches!(err, VoucherError::Validation(_)));
}

/// 完整闭环：批准带 500 金额的申请后，核验该码返回 valid、
/// 金额 500 和正确的申请 ID
#[tokio::test]
async fn approve_then_verify_round_trip() {
    let store = Arc::new(FakeStore::new());
    store.insert_application(make_application(7, Some(500))).await;

    let issuance = IssuanceService::new(store.clone());
    let application = store
        .state
        .lock()
        .await
        .applications
        .get(&7)
        .cloned()
        .unwrap();

    let issued = issuance
        .issue_for_application(&application, Uuid::new_v4(), Some("approved for fall term"))
        .await
        .unwrap();
    assert!(is_well_formed(&issued.voucher_code));

    let verification = VerificationService::new(store.clone());
    let outcome = verification.verify(&issued.voucher_code).await.unwrap();

    match outcome {
        voucher_management::service::VerificationOutcome::Valid(valid) => {
            assert_eq!(valid.application_id, 7);
            assert_eq!(valid.voucher_amount, Some(500));
            assert_eq!(valid.status, "approved");
        }
        other => panic!("期望核验通过，实际: {other:?}"),
    }
}

/// 拨款申请的发放只落在凭证表，核验走凭证表路径
#[tokio::test]
async fn request_issuance_is_verifiable_via_voucher_table() {
    use voucher_management::models::VoucherRequest;

    let store = Arc::new(FakeStore::new());
    let issuance = IssuanceService::new(store.clone());

    let request = VoucherRequest {
        id: 11,
        school_user_id: Uuid::new_v4(),
        school_name: "Riverside Academy".to_string(),
        contact_email: "school@example.org".to_string(),
        amount: 1200,
        purpose: "Library books".to_string(),
        justification: None,
        status: ReviewStatus::Pending,
        requested_at: Utc::now(),
        reviewed_by: None,
        reviewed_at: None,
        review_notes: None,
    };

    let issued = issuance
        .issue_for_request(&request, Uuid::new_v4(), None)
        .await
        .unwrap();

    let verification = VerificationService::new(store.clone());
    let outcome = verification.verify(&issued.voucher_code).await.unwrap();

    match outcome {
        voucher_management::service::VerificationOutcome::Valid(valid) => {
            assert_eq!(valid.voucher_amount, Some(1200));
            assert_eq!(valid.status, "active");
        }
        other => panic!("期望核验通过，实际: {other:?}"),
    }
}
