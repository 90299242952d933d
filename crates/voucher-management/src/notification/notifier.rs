//! 通知入口
//!
//! 包装发送器并提供按审批场景划分的通知方法。所有方法对调用方
//! 都是不失败的：发送异常一律降级为告警日志，审批流程继续。

use std::sync::Arc;

use tracing::{info, warn};

use voucher_shared::config::EmailConfig;

use super::sender::{EmailMessage, EmailSender, LogEmailSender, sender_from_config};
use super::template::EmailTemplate;
use crate::models::{SchoolSignup, ScholarshipApplication, VendorSignup, VoucherRequest};

/// 通知入口
pub struct Notifier {
    sender: Arc<dyn EmailSender>,
}

impl Notifier {
    pub fn new(sender: Arc<dyn EmailSender>) -> Self {
        Self { sender }
    }

    /// 根据配置构建通知入口
    ///
    /// 配置无效时降级到日志发送器并记录告警，不阻止服务启动
    pub fn from_config(config: &EmailConfig) -> Self {
        match sender_from_config(config) {
            Ok(sender) => {
                info!(provider = sender.name(), "邮件发送器已初始化");
                Self {
                    sender: Arc::from(sender),
                }
            }
            Err(e) => {
                warn!(error = %e, "邮件配置无效，降级为日志发送器");
                Self {
                    sender: Arc::new(LogEmailSender),
                }
            }
        }
    }

    /// 奖学金申请批准通知
    pub async fn application_approved(
        &self,
        application: &ScholarshipApplication,
        voucher_code: Option<&str>,
    ) {
        let template = EmailTemplate::ApplicationApproved {
            student_name: application.student_name.clone(),
            school_name: application.school_name.clone(),
            program_type: application.program_type.clone(),
            voucher_code: voucher_code.map(|s| s.to_string()),
            amount: application.voucher_amount,
        };
        self.deliver(&application.email, template).await;
    }

    /// 奖学金申请拒绝通知
    pub async fn application_rejected(&self, application: &ScholarshipApplication) {
        let template = EmailTemplate::ApplicationRejected {
            student_name: application.student_name.clone(),
        };
        self.deliver(&application.email, template).await;
    }

    /// 学校注册审核结果通知
    pub async fn school_signup_reviewed(&self, signup: &SchoolSignup) {
        let template = EmailTemplate::SchoolSignupReviewed {
            school_name: signup.school_name.clone(),
            status: signup.status,
        };
        self.deliver(&signup.email, template).await;
    }

    /// 商户注册审核结果通知
    pub async fn vendor_signup_reviewed(&self, signup: &VendorSignup) {
        let template = EmailTemplate::VendorSignupReviewed {
            vendor_name: signup.vendor_name.clone(),
            status: signup.status,
        };
        self.deliver(&signup.email, template).await;
    }

    /// 拨款申请审核结果通知
    ///
    /// voucher_code 为 Some 表示批准（附兑换码），None 表示拒绝
    pub async fn voucher_request_reviewed(
        &self,
        request: &VoucherRequest,
        voucher_code: Option<&str>,
    ) {
        let template = match voucher_code {
            Some(code) => EmailTemplate::VoucherRequestApproved {
                school_name: request.school_name.clone(),
                purpose: request.purpose.clone(),
                voucher_code: code.to_string(),
                amount: request.amount,
            },
            None => EmailTemplate::VoucherRequestRejected {
                school_name: request.school_name.clone(),
                purpose: request.purpose.clone(),
            },
        };

        self.deliver(&request.contact_email, template).await;
    }

    /// 发送一封通知邮件，失败仅记录告警
    async fn deliver(&self, to: &str, template: EmailTemplate) {
        let message = EmailMessage {
            to: to.to_string(),
            subject: template.subject(),
            html: template.render_html(),
        };

        match self.sender.send(&message).await {
            Ok(receipt) => {
                info!(
                    to = %message.to,
                    subject = %message.subject,
                    message_id = receipt.message_id.as_deref().unwrap_or("-"),
                    "审批通知已发送"
                );
            }
            Err(e) => {
                warn!(
                    to = %message.to,
                    subject = %message.subject,
                    error = %e,
                    "审批通知发送失败，不影响审批结果"
                );
            }
        }
    }
}
