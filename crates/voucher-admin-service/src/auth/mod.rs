//! 认证模块
//!
//! 提供 JWT Token 生成、验证和密码处理功能

mod jwt;
mod password;

pub use jwt::{Claims, JwtConfig, JwtManager};
pub use password::{hash_password, verify_password};

use serde::{Deserialize, Serialize};

/// 账号角色
///
/// 身份层只向业务层提供两件事：调用者是谁、角色是什么
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum UserRole {
    /// 管理员 - 跨账号读写
    Admin,
    /// 学校 - 提交申请、查看自己的记录
    School,
    /// 商户 - 提交与查看兑换码
    Vendor,
}

impl UserRole {
    /// 数据库中的字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::School => "school",
            Self::Vendor => "vendor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_value(UserRole::Admin).unwrap(), "admin");
        assert_eq!(serde_json::to_value(UserRole::Vendor).unwrap(), "vendor");
    }
}
