//! 兑换码一致性检查服务
//!
//! 旧系统将批准申请的两次写入（申请表 + 凭证表）放在事务之外，
//! 存在码只落在一张表的半写入风险。本服务提供管理员触发的比对
//! 报告，找出两张持码表之间的孤儿兑换码。

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::repository::VoucherRepository;

/// 兑换码一致性报告
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeConsistencyReport {
    /// 申请表已发码、凭证表缺少投影的兑换码
    pub application_codes_without_voucher: Vec<String>,
    /// 凭证表来源于申请、申请表却无此码的兑换码
    pub voucher_codes_without_application: Vec<String>,
}

impl CodeConsistencyReport {
    /// 两张表是否一致（无孤儿码）
    pub fn is_consistent(&self) -> bool {
        self.application_codes_without_voucher.is_empty()
            && self.voucher_codes_without_application.is_empty()
    }

    /// 孤儿码总数
    pub fn orphan_count(&self) -> usize {
        self.application_codes_without_voucher.len()
            + self.voucher_codes_without_application.len()
    }
}

/// 一致性检查服务
pub struct ReconcileService {
    repo: Arc<VoucherRepository>,
}

impl ReconcileService {
    pub fn new(repo: Arc<VoucherRepository>) -> Self {
        Self { repo }
    }

    /// 生成兑换码一致性报告
    #[instrument(skip(self))]
    pub async fn voucher_code_report(&self) -> Result<CodeConsistencyReport> {
        let application_codes_without_voucher =
            self.repo.application_codes_missing_from_vouchers().await?;
        let voucher_codes_without_application =
            self.repo.voucher_codes_missing_from_applications().await?;

        let report = CodeConsistencyReport {
            application_codes_without_voucher,
            voucher_codes_without_application,
        };

        if report.is_consistent() {
            info!("兑换码一致性检查通过");
        } else {
            warn!(
                orphan_count = report.orphan_count(),
                "发现半写入的兑换码，需要人工修复"
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_consistency() {
        let report = CodeConsistencyReport {
            application_codes_without_voucher: vec![],
            voucher_codes_without_application: vec![],
        };
        assert!(report.is_consistent());
        assert_eq!(report.orphan_count(), 0);

        let report = CodeConsistencyReport {
            application_codes_without_voucher: vec!["GBF-AB3X-9Q7K".to_string()],
            voucher_codes_without_application: vec![],
        };
        assert!(!report.is_consistent());
        assert_eq!(report.orphan_count(), 1);
    }

    #[test]
    fn test_report_serialization() {
        let report = CodeConsistencyReport {
            application_codes_without_voucher: vec!["GBF-AB3X-9Q7K".to_string()],
            voucher_codes_without_application: vec!["GBF-W2YM-K4PD".to_string()],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["applicationCodesWithoutVoucher"][0], "GBF-AB3X-9Q7K");
        assert_eq!(json["voucherCodesWithoutApplication"][0], "GBF-W2YM-K4PD");
    }
}
