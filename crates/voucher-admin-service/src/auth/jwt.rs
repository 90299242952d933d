//! JWT Token 处理
//!
//! 提供 JWT Token 的生成和验证功能

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserRole;
use crate::error::AdminError;

/// JWT 配置
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// 签名密钥
    pub secret: String,
    /// Token 过期时间（秒）
    pub expires_in_secs: i64,
    /// Token 签发者
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "voucher-admin-secret-key-change-in-production".to_string(),
            expires_in_secs: 86400, // 24 小时
            issuer: "voucher-admin-service".to_string(),
        }
    }
}

/// JWT Claims（Token 载荷）
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// 账号 ID
    pub sub: String,
    /// 邮箱
    pub email: String,
    /// 显示名称
    pub display_name: Option<String>,
    /// 角色
    pub role: UserRole,
    /// 签发时间
    pub iat: i64,
    /// 过期时间
    pub exp: i64,
    /// 签发者
    pub iss: String,
}

impl Claims {
    /// 解析账号 ID
    pub fn user_id(&self) -> Result<Uuid, AdminError> {
        self.sub
            .parse()
            .map_err(|_| AdminError::Internal("Token 中的账号 ID 无效".to_string()))
    }

    /// 要求调用者具备指定角色
    pub fn require_role(&self, role: UserRole) -> Result<(), AdminError> {
        if self.role != role {
            return Err(AdminError::Forbidden(format!(
                "此操作需要 {} 角色",
                role.as_str()
            )));
        }
        Ok(())
    }
}

/// JWT 管理器
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    /// 创建 JWT 管理器
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 生成 JWT Token，返回 (token, 过期时间戳)
    pub fn generate_token(
        &self,
        user_id: Uuid,
        email: &str,
        display_name: Option<&str>,
        role: UserRole,
    ) -> Result<(String, i64), AdminError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.expires_in_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            display_name: display_name.map(|s| s.to_string()),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.issuer.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AdminError::Internal(format!("JWT 生成失败: {}", e)))?;

        Ok((token, exp.timestamp()))
    }

    /// 验证并解析 JWT Token
    ///
    /// 返回解析后的 Claims，如果 Token 无效或过期则返回错误
    pub fn verify_token(&self, token: &str) -> Result<Claims, AdminError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AdminError::Unauthorized("Token 已过期".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AdminError::Unauthorized("无效的 Token".to_string())
                }
                _ => AdminError::Unauthorized(format!("Token 验证失败: {}", e)),
            },
        )?;

        Ok(token_data.claims)
    }

    /// 刷新 Token
    ///
    /// 基于现有的 Claims 生成新的 Token（延长过期时间）
    pub fn refresh_token(&self, claims: &Claims) -> Result<(String, i64), AdminError> {
        let user_id = claims.user_id()?;
        self.generate_token(
            user_id,
            &claims.email,
            claims.display_name.as_deref(),
            claims.role,
        )
    }

    /// 获取 Token 过期时间（秒）
    pub fn expires_in_secs(&self) -> i64 {
        self.config.expires_in_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_verify_token() {
        let config = JwtConfig::default();
        let manager = JwtManager::new(config);
        let user_id = Uuid::new_v4();

        let (token, _exp) = manager
            .generate_token(user_id, "admin@example.org", Some("管理员"), UserRole::Admin)
            .unwrap();

        let claims = manager.verify_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.email, "admin@example.org");
        assert_eq!(claims.role, UserRole::Admin);
    }

    #[test]
    fn test_invalid_token() {
        let config = JwtConfig::default();
        let manager = JwtManager::new(config);

        let result = manager.verify_token("invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_require_role() {
        let config = JwtConfig::default();
        let manager = JwtManager::new(config);
        let (token, _) = manager
            .generate_token(Uuid::new_v4(), "school@example.org", None, UserRole::School)
            .unwrap();

        let claims = manager.verify_token(&token).unwrap();
        assert!(claims.require_role(UserRole::School).is_ok());
        assert!(claims.require_role(UserRole::Admin).is_err());
    }
}
