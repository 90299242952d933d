//! 邮件通知模块
//!
//! 审批结果的邮件通知是尽力而为的副作用：发送失败只记录告警，
//! 不影响也不回滚触发它的审批操作。

pub mod notifier;
pub mod sender;
pub mod template;

pub use notifier::Notifier;
pub use sender::{EmailMessage, EmailSender, LogEmailSender, ResendEmailSender, SendReceipt};
pub use template::EmailTemplate;

use thiserror::Error;

/// 邮件通知错误
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("邮件服务请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("邮件服务返回错误: status={status}, body={body}")]
    Provider { status: u16, body: String },

    #[error("邮件配置无效: {0}")]
    Config(String),
}
