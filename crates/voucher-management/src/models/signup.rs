//! 注册记录实体定义
//!
//! 学校与商户的自助注册记录，创建后仅管理员可变更状态

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{SchoolSignupStatus, VendorSignupStatus};

/// 学校注册记录
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SchoolSignup {
    pub id: i64,
    /// 注册账号 ID（身份层分配）
    pub user_id: Uuid,
    pub email: String,
    pub school_name: String,
    pub contact_name: String,
    #[sqlx(default)]
    pub contact_phone: Option<String>,
    #[sqlx(default)]
    pub school_address: Option<String>,
    #[sqlx(default)]
    pub school_district: Option<String>,
    #[sqlx(default)]
    pub school_type: Option<String>,
    #[sqlx(default)]
    pub student_count: Option<i32>,
    #[sqlx(default)]
    pub website: Option<String>,
    #[sqlx(default)]
    pub additional_info: Option<String>,
    pub status: SchoolSignupStatus,
    #[sqlx(default)]
    pub reviewed_by: Option<Uuid>,
    #[sqlx(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 新建学校注册记录的输入
#[derive(Debug, Clone)]
pub struct NewSchoolSignup {
    pub user_id: Uuid,
    pub email: String,
    pub school_name: String,
    pub contact_name: String,
    pub contact_phone: Option<String>,
    pub school_address: Option<String>,
    pub school_district: Option<String>,
    pub school_type: Option<String>,
    pub student_count: Option<i32>,
    pub website: Option<String>,
    pub additional_info: Option<String>,
}

/// 商户注册记录
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VendorSignup {
    pub id: i64,
    pub user_id: Uuid,
    pub email: String,
    pub vendor_name: String,
    pub vendor_type: String,
    pub country: String,
    pub contact_name: String,
    #[sqlx(default)]
    pub contact_phone: Option<String>,
    pub status: VendorSignupStatus,
    /// 风险标记 - 管理员复核时手动设置
    pub risk_flag: bool,
    #[sqlx(default)]
    pub notes: Option<String>,
    #[sqlx(default)]
    pub reviewed_by: Option<Uuid>,
    #[sqlx(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 新建商户注册记录的输入
#[derive(Debug, Clone)]
pub struct NewVendorSignup {
    pub user_id: Uuid,
    pub email: String,
    pub vendor_name: String,
    pub vendor_type: String,
    pub country: String,
    pub contact_name: String,
    pub contact_phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_school_signup_serialization_is_camel_case() {
        let signup = SchoolSignup {
            id: 1,
            user_id: Uuid::nil(),
            email: "school@example.org".to_string(),
            school_name: "Riverside Academy".to_string(),
            contact_name: "Dana Reyes".to_string(),
            contact_phone: None,
            school_address: None,
            school_district: Some("District 4".to_string()),
            school_type: None,
            student_count: Some(320),
            website: None,
            additional_info: None,
            status: SchoolSignupStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&signup).unwrap();
        assert_eq!(json["schoolName"], "Riverside Academy");
        assert_eq!(json["studentCount"], 320);
        assert_eq!(json["status"], "pending");
    }
}
