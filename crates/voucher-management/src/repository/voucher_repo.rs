//! 兑换凭证仓储
//!
//! 提供凭证记录的数据访问，以及跨持码表的唯一性探测与一致性比对

use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewVoucher, Voucher, VoucherStatus};

const VOUCHER_COLUMNS: &str = r#"id, voucher_code, school_id, amount, purpose, status,
       created_by, application_id, request_id, expires_at, used_at, created_at"#;

/// 兑换凭证仓储
pub struct VoucherRepository {
    pool: PgPool,
}

impl VoucherRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 唯一性探测 ====================

    /// 探测兑换码是否已被占用
    ///
    /// 兑换码同时存在于 scholarship_applications 与 vouchers 两张表，
    /// 任一表命中都视为占用。只读，不加锁；最终唯一性由两列上的
    /// 唯一约束保证。
    pub async fn code_exists(&self, code: &str) -> Result<bool> {
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

    // ==================== 凭证 CRUD ====================

    /// 创建凭证记录，返回新记录 ID
    pub async fn create(&self, input: &NewVoucher) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO vouchers
                (voucher_code, school_id, amount, purpose, status, created_by,
                 application_id, request_id, expires_at, created_at)
            VALUES ($1, $2, $3, $4, 'active', $5, $6, $7, $8, NOW())
            RETURNING id
            "#,
        )
        .bind(&input.voucher_code)
        .bind(input.school_id)
        .bind(input.amount)
        .bind(&input.purpose)
        .bind(input.created_by)
        .bind(input.application_id)
        .bind(input.request_id)
        .bind(input.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    /// 在事务中创建凭证记录
    pub async fn create_in_tx(tx: &mut PgConnection, input: &NewVoucher) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO vouchers
                (voucher_code, school_id, amount, purpose, status, created_by,
                 application_id, request_id, expires_at, created_at)
            VALUES ($1, $2, $3, $4, 'active', $5, $6, $7, $8, NOW())
            RETURNING id
            "#,
        )
        .bind(&input.voucher_code)
        .bind(input.school_id)
        .bind(input.amount)
        .bind(&input.purpose)
        .bind(input.created_by)
        .bind(input.application_id)
        .bind(input.request_id)
        .bind(input.expires_at)
        .fetch_one(tx)
        .await?;

        Ok(row.get("id"))
    }

    /// 获取单个凭证
    pub async fn get(&self, id: i64) -> Result<Option<Voucher>> {
        let voucher = sqlx::query_as::<_, Voucher>(&format!(
            "SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(voucher)
    }

    /// 列出凭证（可按状态过滤）
    pub async fn list(&self, status: Option<VoucherStatus>) -> Result<Vec<Voucher>> {
        let vouchers = match status {
            Some(status) => {
                sqlx::query_as::<_, Voucher>(&format!(
                    r#"
                    SELECT {VOUCHER_COLUMNS}
                    FROM vouchers
                    WHERE status = $1
                    ORDER BY created_at DESC
                    "#
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Voucher>(&format!(
                    r#"
                    SELECT {VOUCHER_COLUMNS}
                    FROM vouchers
                    ORDER BY created_at DESC
                    "#
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(vouchers)
    }

    /// 列出某学校的全部凭证
    pub async fn list_by_school(&self, school_id: Uuid) -> Result<Vec<Voucher>> {
        let vouchers = sqlx::query_as::<_, Voucher>(&format!(
            r#"
            SELECT {VOUCHER_COLUMNS}
            FROM vouchers
            WHERE school_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(school_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(vouchers)
    }

    /// 按兑换码精确查找凭证
    pub async fn find_by_code(&self, code: &str) -> Result<Vec<Voucher>> {
        let vouchers = sqlx::query_as::<_, Voucher>(&format!(
            "SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE voucher_code = $1"
        ))
        .bind(code)
        .fetch_all(&self.pool)
        .await?;

        Ok(vouchers)
    }

    /// 作废凭证
    ///
    /// 仅 active 状态可作废，返回受影响行数
    pub async fn cancel(&self, id: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE vouchers
            SET status = 'cancelled'
            WHERE id = $1 AND status = 'active'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// 在事务中将凭证标记为已使用
    ///
    /// 仅 active 状态可核销；返回被更新的凭证 ID（未命中则为 None）
    pub async fn mark_used_in_tx(tx: &mut PgConnection, code: &str) -> Result<Option<i64>> {
        let row = sqlx::query(
            r#"
            UPDATE vouchers
            SET status = 'used', used_at = NOW()
            WHERE voucher_code = $1 AND status = 'active'
            RETURNING id
            "#,
        )
        .bind(code)
        .fetch_optional(tx)
        .await?;

        Ok(row.map(|r| r.get("id")))
    }

    // ==================== 一致性比对 ====================

    /// 找出申请表中已发码但凭证表缺失投影的兑换码
    ///
    /// 用于发现旧系统遗留的半写入数据（码只落在一张表）
    pub async fn application_codes_missing_from_vouchers(&self) -> Result<Vec<String>> {
        let codes: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT a.voucher_code
            FROM scholarship_applications a
            WHERE a.voucher_code IS NOT NULL
              AND NOT EXISTS (
                  SELECT 1 FROM vouchers v WHERE v.voucher_code = a.voucher_code
              )
            ORDER BY a.voucher_code ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }

    /// 找出凭证表中来源于申请、但申请表缺码的兑换码
    ///
    /// 拨款申请产生的凭证只存在于 vouchers 表，属正常情况，因此
    /// 只比对 application_id 非空的记录
    pub async fn voucher_codes_missing_from_applications(&self) -> Result<Vec<String>> {
        let codes: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT v.voucher_code
            FROM vouchers v
            WHERE v.application_id IS NOT NULL
              AND NOT EXISTS (
                  SELECT 1 FROM scholarship_applications a
                  WHERE a.voucher_code = v.voucher_code
              )
            ORDER BY v.voucher_code ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }
}
