//! 发放与核验存储的 PostgreSQL 实现

use async_trait::async_trait;
use sqlx::PgPool;

use super::application_repo::ApplicationRepository;
use super::traits::{ApplicationApproval, IssuanceStore, RequestApproval, VerificationStore};
use super::voucher_repo::VoucherRepository;
use crate::error::{Result, VoucherError, is_unique_violation};
use crate::models::{NewVoucher, ScholarshipApplication, Voucher};

const APPLICATION_COLUMNS: &str = r#"id, student_name, email, phone, school_name, district,
       grade_level, program_type, financial_need_description, academic_goals,
       student_count, voucher_amount, voucher_code, country, status,
       applied_date, reviewed_by, reviewed_at, notes, school_user_id"#;

const VOUCHER_COLUMNS: &str = r#"id, voucher_code, school_id, amount, purpose, status,
       created_by, application_id, request_id, expires_at, used_at, created_at"#;

/// 将唯一约束冲突归一化为 CodeConflict
///
/// 发放循环只识别 CodeConflict 作为"换码重试"信号，其余数据库错误
/// 原样向上传播
fn map_code_conflict(err: VoucherError, code: &str) -> VoucherError {
    match &err {
        VoucherError::Database(db_err) if is_unique_violation(db_err) => {
            VoucherError::CodeConflict(code.to_string())
        }
        _ => err,
    }
}

/// 发放存储的 PostgreSQL 实现
pub struct PgIssuanceStore {
    pool: PgPool,
}

impl PgIssuanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IssuanceStore for PgIssuanceStore {
    async fn code_exists(&self, code: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM scholarship_applications WHERE voucher_code = $1
            ) OR EXISTS(
                SELECT 1 FROM vouchers WHERE voucher_code = $1
            )
            "#,
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn commit_application_approval(&self, approval: &ApplicationApproval) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let updated = ApplicationRepository::approve_with_code_in_tx(
            &mut tx,
            approval.application_id,
            &approval.voucher_code,
            approval.reviewer,
            approval.notes.as_deref(),
        )
        .await
        .map_err(|e| map_code_conflict(e, &approval.voucher_code))?;

        // WHERE status = 'pending' 未命中：记录不存在或已被并发审核
        if updated == 0 {
            return Err(VoucherError::InvalidStatusTransition {
                entity: "scholarship_application",
                id: approval.application_id,
                from: "non-pending".to_string(),
                to: "approved".to_string(),
            });
        }

        let voucher = NewVoucher {
            voucher_code: approval.voucher_code.clone(),
            school_id: approval.school_id,
            amount: approval.amount,
            purpose: approval.purpose.clone(),
            created_by: approval.reviewer,
            application_id: Some(approval.application_id),
            request_id: None,
            expires_at: None,
        };
        let voucher_id = VoucherRepository::create_in_tx(&mut tx, &voucher)
            .await
            .map_err(|e| map_code_conflict(e, &approval.voucher_code))?;

        tx.commit()
            .await
            .map_err(|e| map_code_conflict(VoucherError::Database(e), &approval.voucher_code))?;

        Ok(voucher_id)
    }

    async fn commit_request_approval(&self, approval: &RequestApproval) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let updated = ApplicationRepository::approve_request_in_tx(
            &mut tx,
            approval.request_id,
            approval.reviewer,
            approval.notes.as_deref(),
        )
        .await?;

        if updated == 0 {
            return Err(VoucherError::InvalidStatusTransition {
                entity: "voucher_request",
                id: approval.request_id,
                from: "non-pending".to_string(),
                to: "approved".to_string(),
            });
        }

        let voucher = NewVoucher {
            voucher_code: approval.voucher_code.clone(),
            school_id: approval.school_id,
            amount: approval.amount,
            purpose: approval.purpose.clone(),
            created_by: approval.reviewer,
            application_id: None,
            request_id: Some(approval.request_id),
            expires_at: None,
        };
        let voucher_id = VoucherRepository::create_in_tx(&mut tx, &voucher)
            .await
            .map_err(|e| map_code_conflict(e, &approval.voucher_code))?;

        tx.commit()
            .await
            .map_err(|e| map_code_conflict(VoucherError::Database(e), &approval.voucher_code))?;

        Ok(voucher_id)
    }
}

/// 核验存储的 PostgreSQL 实现
///
/// 核验端点以服务身份访问数据库（商户本身无权读取申请与凭证表），
/// 因此全部查询都不做行级归属过滤。
pub struct PgVerificationStore {
    pool: PgPool,
}

impl PgVerificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationStore for PgVerificationStore {
    async fn applications_by_code(&self, code: &str) -> Result<Vec<ScholarshipApplication>> {
        let applications = sqlx::query_as::<_, ScholarshipApplication>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM scholarship_applications WHERE voucher_code = $1"
        ))
        .bind(code)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    async fn vouchers_by_code(&self, code: &str) -> Result<Vec<Voucher>> {
        let vouchers = sqlx::query_as::<_, Voucher>(&format!(
            "SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE voucher_code = $1"
        ))
        .bind(code)
        .fetch_all(&self.pool)
        .await?;

        Ok(vouchers)
    }

    async fn application_by_code_case_insensitive(
        &self,
        code: &str,
    ) -> Result<Option<ScholarshipApplication>> {
        // ILIKE 无通配符等价于忽略大小写的精确匹配
        let application = sqlx::query_as::<_, ScholarshipApplication>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM scholarship_applications
            WHERE voucher_code ILIKE $1
            LIMIT 1
            "#
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    async fn voucher_by_code_case_insensitive(&self, code: &str) -> Result<Option<Voucher>> {
        let voucher = sqlx::query_as::<_, Voucher>(&format!(
            r#"
            SELECT {VOUCHER_COLUMNS}
            FROM vouchers
            WHERE voucher_code ILIKE $1
            LIMIT 1
            "#
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(voucher)
    }

    async fn approved_application_id_by_code(&self, code: &str) -> Result<Option<i64>> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM scholarship_applications
            WHERE voucher_code = $1 AND status = 'approved'
            LIMIT 1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }
}
