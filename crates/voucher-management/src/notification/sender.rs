//! 邮件发送器
//!
//! 通过 `EmailSender` trait 抽象发送行为：开发环境使用日志发送器
//! （仅记录日志），生产环境使用 Resend HTTP API 发送器。替换服务商
//! 时只需实现同一 trait。

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use voucher_shared::config::EmailConfig;

use super::NotificationError;

/// Resend API 端点
const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// 待发送的邮件
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// 发送回执
///
/// message_id 为服务商返回的投递标识，用于追踪投递状态
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub message_id: Option<String>,
}

/// 邮件发送器 trait
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// 发送一封邮件
    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, NotificationError>;

    /// 发送器名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 根据配置构建发送器
///
/// provider 为 `resend` 时要求提供 api_key，其余值一律回退到
/// 日志发送器。
pub fn sender_from_config(
    config: &EmailConfig,
) -> Result<Box<dyn EmailSender>, NotificationError> {
    match config.provider.as_str() {
        "resend" => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                NotificationError::Config("provider=resend 时必须配置 api_key".to_string())
            })?;
            Ok(Box::new(ResendEmailSender::new(
                api_key,
                config.from_address.clone(),
            )))
        }
        _ => Ok(Box::new(LogEmailSender)),
    }
}

// ---------------------------------------------------------------------------
// 日志发送器
// ---------------------------------------------------------------------------

/// 日志发送器
///
/// 仅记录日志不实际发送，便于在无外部依赖的情况下验证通知管道
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, NotificationError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "模拟发送邮件通知"
        );

        Ok(SendReceipt { message_id: None })
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

// ---------------------------------------------------------------------------
// Resend 发送器
// ---------------------------------------------------------------------------

/// Resend API 响应体
#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: String,
}

/// Resend HTTP API 发送器
pub struct ResendEmailSender {
    client: reqwest::Client,
    api_key: String,
    from_address: String,
}

impl ResendEmailSender {
    pub fn new(api_key: String, from_address: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from_address,
        }
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, NotificationError> {
        let body = json!({
            "from": self.from_address,
            "to": [message.to],
            "subject": message.subject,
            "html": message.html,
        });

        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ResendResponse = response.json().await?;

        info!(
            to = %message.to,
            message_id = %parsed.id,
            "邮件已通过 Resend 发送"
        );

        Ok(SendReceipt {
            message_id: Some(parsed.id),
        })
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_message() -> EmailMessage {
        EmailMessage {
            to: "school@example.org".to_string(),
            subject: "Your Scholarship Application Has Been Approved!".to_string(),
            html: "<p>Congratulations!</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_log_sender_always_succeeds() {
        let sender = LogEmailSender;
        let receipt = sender.send(&make_test_message()).await.unwrap();
        assert!(receipt.message_id.is_none());
        assert_eq!(sender.name(), "log");
    }

    #[test]
    fn test_sender_from_config_defaults_to_log() {
        let config = EmailConfig::default();
        let sender = sender_from_config(&config).unwrap();
        assert_eq!(sender.name(), "log");
    }

    #[test]
    fn test_sender_from_config_resend_requires_api_key() {
        let config = EmailConfig {
            provider: "resend".to_string(),
            api_key: None,
            from_address: "noreply@example.org".to_string(),
        };
        assert!(sender_from_config(&config).is_err());
    }

    #[test]
    fn test_sender_from_config_resend() {
        let config = EmailConfig {
            provider: "resend".to_string(),
            api_key: Some("re_test_key".to_string()),
            from_address: "noreply@example.org".to_string(),
        };
        let sender = sender_from_config(&config).unwrap();
        assert_eq!(sender.name(), "resend");
    }
}
