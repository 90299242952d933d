//! 注册记录仓储
//!
//! 提供学校与商户注册记录的数据访问

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    NewSchoolSignup, NewVendorSignup, SchoolSignup, SchoolSignupStatus, VendorSignup,
    VendorSignupStatus,
};

const SCHOOL_SIGNUP_COLUMNS: &str = r#"id, user_id, email, school_name, contact_name,
       contact_phone, school_address, school_district, school_type, student_count,
       website, additional_info, status, reviewed_by, reviewed_at, review_notes,
       created_at"#;

const VENDOR_SIGNUP_COLUMNS: &str = r#"id, user_id, email, vendor_name, vendor_type, country,
       contact_name, contact_phone, status, risk_flag, notes, reviewed_by,
       reviewed_at, review_notes, created_at"#;

/// 注册记录仓储
pub struct SignupRepository {
    pool: PgPool,
}

impl SignupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 学校注册 ====================

    /// 创建学校注册记录，返回新记录 ID
    pub async fn create_school_signup(&self, input: &NewSchoolSignup) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO school_signups
                (user_id, email, school_name, contact_name, contact_phone,
                 school_address, school_district, school_type, student_count,
                 website, additional_info, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending', NOW())
            RETURNING id
            "#,
        )
        .bind(input.user_id)
        .bind(&input.email)
        .bind(&input.school_name)
        .bind(&input.contact_name)
        .bind(&input.contact_phone)
        .bind(&input.school_address)
        .bind(&input.school_district)
        .bind(&input.school_type)
        .bind(input.student_count)
        .bind(&input.website)
        .bind(&input.additional_info)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    /// 获取单条学校注册记录
    pub async fn get_school_signup(&self, id: i64) -> Result<Option<SchoolSignup>> {
        let signup = sqlx::query_as::<_, SchoolSignup>(&format!(
            "SELECT {SCHOOL_SIGNUP_COLUMNS} FROM school_signups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(signup)
    }

    /// 按注册账号查找学校注册记录
    pub async fn get_school_signup_by_user(&self, user_id: Uuid) -> Result<Option<SchoolSignup>> {
        let signup = sqlx::query_as::<_, SchoolSignup>(&format!(
            "SELECT {SCHOOL_SIGNUP_COLUMNS} FROM school_signups WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(signup)
    }

    /// 列出学校注册记录（可按状态过滤），按提交时间倒序
    pub async fn list_school_signups(
        &self,
        status: Option<SchoolSignupStatus>,
    ) -> Result<Vec<SchoolSignup>> {
        let signups = match status {
            Some(status) => {
                sqlx::query_as::<_, SchoolSignup>(&format!(
                    r#"
                    SELECT {SCHOOL_SIGNUP_COLUMNS}
                    FROM school_signups
                    WHERE status = $1
                    ORDER BY created_at DESC
                    "#
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, SchoolSignup>(&format!(
                    r#"
                    SELECT {SCHOOL_SIGNUP_COLUMNS}
                    FROM school_signups
                    ORDER BY created_at DESC
                    "#
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(signups)
    }

    /// 更新学校注册记录的审核结果
    pub async fn review_school_signup(
        &self,
        id: i64,
        status: SchoolSignupStatus,
        reviewer: Uuid,
        notes: Option<&str>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE school_signups
            SET status = $2, reviewed_by = $3, reviewed_at = NOW(), review_notes = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reviewer)
        .bind(notes)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // ==================== 商户注册 ====================

    /// 创建商户注册记录，返回新记录 ID
    pub async fn create_vendor_signup(&self, input: &NewVendorSignup) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO vendor_signups
                (user_id, email, vendor_name, vendor_type, country, contact_name,
                 contact_phone, status, risk_flag, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'submitted', false, NOW())
            RETURNING id
            "#,
        )
        .bind(input.user_id)
        .bind(&input.email)
        .bind(&input.vendor_name)
        .bind(&input.vendor_type)
        .bind(&input.country)
        .bind(&input.contact_name)
        .bind(&input.contact_phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    /// 获取单条商户注册记录
    pub async fn get_vendor_signup(&self, id: i64) -> Result<Option<VendorSignup>> {
        let signup = sqlx::query_as::<_, VendorSignup>(&format!(
            "SELECT {VENDOR_SIGNUP_COLUMNS} FROM vendor_signups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(signup)
    }

    /// 按注册账号查找商户注册记录
    pub async fn get_vendor_signup_by_user(&self, user_id: Uuid) -> Result<Option<VendorSignup>> {
        let signup = sqlx::query_as::<_, VendorSignup>(&format!(
            "SELECT {VENDOR_SIGNUP_COLUMNS} FROM vendor_signups WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(signup)
    }

    /// 列出商户注册记录（可按状态过滤）
    pub async fn list_vendor_signups(
        &self,
        status: Option<VendorSignupStatus>,
    ) -> Result<Vec<VendorSignup>> {
        let signups = match status {
            Some(status) => {
                sqlx::query_as::<_, VendorSignup>(&format!(
                    r#"
                    SELECT {VENDOR_SIGNUP_COLUMNS}
                    FROM vendor_signups
                    WHERE status = $1
                    ORDER BY created_at DESC
                    "#
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, VendorSignup>(&format!(
                    r#"
                    SELECT {VENDOR_SIGNUP_COLUMNS}
                    FROM vendor_signups
                    ORDER BY created_at DESC
                    "#
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(signups)
    }

    /// 更新商户注册记录的审核结果（含风险标记）
    pub async fn review_vendor_signup(
        &self,
        id: i64,
        status: VendorSignupStatus,
        risk_flag: bool,
        reviewer: Uuid,
        notes: Option<&str>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE vendor_signups
            SET status = $2, risk_flag = $3, reviewed_by = $4,
                reviewed_at = NOW(), review_notes = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(risk_flag)
        .bind(reviewer)
        .bind(notes)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
