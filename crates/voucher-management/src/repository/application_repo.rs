//! 申请仓储
//!
//! 提供奖学金申请与拨款申请的数据访问

use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    NewScholarshipApplication, NewVoucherRequest, ReviewStatus, ScholarshipApplication,
    VoucherRequest,
};

const APPLICATION_COLUMNS: &str = r#"id, student_name, email, phone, school_name, district,
       grade_level, program_type, financial_need_description, academic_goals,
       student_count, voucher_amount, voucher_code, country, status,
       applied_date, reviewed_by, reviewed_at, notes, school_user_id"#;

const REQUEST_COLUMNS: &str = r#"id, school_user_id, school_name, contact_email, amount, purpose,
       justification, status, requested_at, reviewed_by, reviewed_at, review_notes"#;

/// 申请仓储
pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 奖学金申请 ====================

    /// 创建奖学金申请，返回新记录 ID
    pub async fn create(&self, input: &NewScholarshipApplication) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO scholarship_applications
                (student_name, email, phone, school_name, district, grade_level,
                 program_type, financial_need_description, academic_goals,
                 student_count, voucher_amount, country, status, applied_date,
                 school_user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'pending', NOW(), $13)
            RETURNING id
            "#,
        )
        .bind(&input.student_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.school_name)
        .bind(&input.district)
        .bind(&input.grade_level)
        .bind(&input.program_type)
        .bind(&input.financial_need_description)
        .bind(&input.academic_goals)
        .bind(input.student_count)
        .bind(input.voucher_amount)
        .bind(&input.country)
        .bind(input.school_user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    /// 获取单个奖学金申请
    pub async fn get(&self, id: i64) -> Result<Option<ScholarshipApplication>> {
        let application = sqlx::query_as::<_, ScholarshipApplication>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM scholarship_applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    /// 列出奖学金申请（可按状态过滤），按提交时间倒序
    pub async fn list(&self, status: Option<ReviewStatus>) -> Result<Vec<ScholarshipApplication>> {
        let applications = match status {
            Some(status) => {
                sqlx::query_as::<_, ScholarshipApplication>(&format!(
                    r#"
                    SELECT {APPLICATION_COLUMNS}
                    FROM scholarship_applications
                    WHERE status = $1
                    ORDER BY applied_date DESC
                    "#
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ScholarshipApplication>(&format!(
                    r#"
                    SELECT {APPLICATION_COLUMNS}
                    FROM scholarship_applications
                    ORDER BY applied_date DESC
                    "#
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(applications)
    }

    /// 列出某学校账号提交的全部申请
    pub async fn list_by_school(&self, school_user_id: Uuid) -> Result<Vec<ScholarshipApplication>> {
        let applications = sqlx::query_as::<_, ScholarshipApplication>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM scholarship_applications
            WHERE school_user_id = $1
            ORDER BY applied_date DESC
            "#
        ))
        .bind(school_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    /// 拒绝申请
    ///
    /// 仅对 pending 记录生效，返回受影响行数
    pub async fn reject(&self, id: i64, reviewer: Uuid, notes: Option<&str>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE scholarship_applications
            SET status = 'rejected', reviewed_by = $2, reviewed_at = NOW(), notes = $3
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(reviewer)
        .bind(notes)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// 批准不带金额的申请（无需发放兑换码）
    pub async fn approve_without_code(
        &self,
        id: i64,
        reviewer: Uuid,
        notes: Option<&str>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE scholarship_applications
            SET status = 'approved', reviewed_by = $2, reviewed_at = NOW(), notes = $3
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(reviewer)
        .bind(notes)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// 在事务中批准申请并写入兑换码
    ///
    /// WHERE 条件限定 pending，并发的重复批准只会有一个写入成功
    pub async fn approve_with_code_in_tx(
        tx: &mut PgConnection,
        id: i64,
        voucher_code: &str,
        reviewer: Uuid,
        notes: Option<&str>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE scholarship_applications
            SET status = 'approved', voucher_code = $2, reviewed_by = $3,
                reviewed_at = NOW(), notes = $4
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(voucher_code)
        .bind(reviewer)
        .bind(notes)
        .execute(tx)
        .await?;

        Ok(result.rows_affected())
    }

    // ==================== 拨款申请 ====================

    /// 创建拨款申请，返回新记录 ID
    pub async fn create_request(&self, input: &NewVoucherRequest) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO voucher_requests
                (school_user_id, school_name, contact_email, amount, purpose,
                 justification, status, requested_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', NOW())
            RETURNING id
            "#,
        )
        .bind(input.school_user_id)
        .bind(&input.school_name)
        .bind(&input.contact_email)
        .bind(input.amount)
        .bind(&input.purpose)
        .bind(&input.justification)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    /// 获取单个拨款申请
    pub async fn get_request(&self, id: i64) -> Result<Option<VoucherRequest>> {
        let request = sqlx::query_as::<_, VoucherRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM voucher_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// 列出拨款申请（可按状态过滤）
    pub async fn list_requests(&self, status: Option<ReviewStatus>) -> Result<Vec<VoucherRequest>> {
        let requests = match status {
            Some(status) => {
                sqlx::query_as::<_, VoucherRequest>(&format!(
                    r#"
                    SELECT {REQUEST_COLUMNS}
                    FROM voucher_requests
                    WHERE status = $1
                    ORDER BY requested_at DESC
                    "#
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, VoucherRequest>(&format!(
                    r#"
                    SELECT {REQUEST_COLUMNS}
                    FROM voucher_requests
                    ORDER BY requested_at DESC
                    "#
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(requests)
    }

    /// 列出某学校账号的全部拨款申请
    pub async fn list_requests_by_school(
        &self,
        school_user_id: Uuid,
    ) -> Result<Vec<VoucherRequest>> {
        let requests = sqlx::query_as::<_, VoucherRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM voucher_requests
            WHERE school_user_id = $1
            ORDER BY requested_at DESC
            "#
        ))
        .bind(school_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// 拒绝拨款申请，仅对 pending 记录生效
    pub async fn reject_request(
        &self,
        id: i64,
        reviewer: Uuid,
        notes: Option<&str>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE voucher_requests
            SET status = 'rejected', reviewed_by = $2, reviewed_at = NOW(), review_notes = $3
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(reviewer)
        .bind(notes)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// 在事务中批准拨款申请
    pub async fn approve_request_in_tx(
        tx: &mut PgConnection,
        id: i64,
        reviewer: Uuid,
        notes: Option<&str>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE voucher_requests
            SET status = 'approved', reviewed_by = $2, reviewed_at = NOW(), review_notes = $3
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(reviewer)
        .bind(notes)
        .execute(tx)
        .await?;

        Ok(result.rows_affected())
    }
}
