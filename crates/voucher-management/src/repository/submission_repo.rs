//! 商户提交仓储
//!
//! 提供商户兑换码提交记录的数据访问

use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewVendorVoucherSubmission, ReviewStatus, VendorVoucherSubmission};

const SUBMISSION_COLUMNS: &str = r#"id, vendor_id, voucher_code, voucher_application_id,
       status, verification_status, submitted_at, reviewed_by, reviewed_at,
       review_notes"#;

/// 商户提交仓储
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 创建提交记录，返回新记录 ID
    ///
    /// verification_status 在此一次性写入，之后不再变更
    pub async fn create(&self, input: &NewVendorVoucherSubmission) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO vendor_voucher_submissions
                (vendor_id, voucher_code, voucher_application_id, status,
                 verification_status, submitted_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id
            "#,
        )
        .bind(input.vendor_id)
        .bind(&input.voucher_code)
        .bind(input.voucher_application_id)
        .bind(input.status)
        .bind(input.verification_status)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    /// 获取单条提交记录
    pub async fn get(&self, id: i64) -> Result<Option<VendorVoucherSubmission>> {
        let submission = sqlx::query_as::<_, VendorVoucherSubmission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM vendor_voucher_submissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(submission)
    }

    /// 列出提交记录（可按审批状态过滤），按提交时间倒序
    pub async fn list(&self, status: Option<ReviewStatus>) -> Result<Vec<VendorVoucherSubmission>> {
        let submissions = match status {
            Some(status) => {
                sqlx::query_as::<_, VendorVoucherSubmission>(&format!(
                    r#"
                    SELECT {SUBMISSION_COLUMNS}
                    FROM vendor_voucher_submissions
                    WHERE status = $1
                    ORDER BY submitted_at DESC
                    "#
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, VendorVoucherSubmission>(&format!(
                    r#"
                    SELECT {SUBMISSION_COLUMNS}
                    FROM vendor_voucher_submissions
                    ORDER BY submitted_at DESC
                    "#
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(submissions)
    }

    /// 列出某商户的全部提交记录
    pub async fn list_by_vendor(&self, vendor_id: Uuid) -> Result<Vec<VendorVoucherSubmission>> {
        let submissions = sqlx::query_as::<_, VendorVoucherSubmission>(&format!(
            r#"
            SELECT {SUBMISSION_COLUMNS}
            FROM vendor_voucher_submissions
            WHERE vendor_id = $1
            ORDER BY submitted_at DESC
            "#
        ))
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }

    /// 在事务中更新提交记录的审批结果
    ///
    /// 仅对 pending 记录生效，返回受影响行数
    pub async fn review_in_tx(
        tx: &mut PgConnection,
        id: i64,
        status: ReviewStatus,
        reviewer: Uuid,
        notes: Option<&str>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE vendor_voucher_submissions
            SET status = $2, reviewed_by = $3, reviewed_at = NOW(), review_notes = $4
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reviewer)
        .bind(notes)
        .execute(tx)
        .await?;

        Ok(result.rows_affected())
    }
}
