//! 邮件模板
//!
//! 根据审批结果渲染邮件标题与 HTML 正文。当前使用硬编码模板以
//! 降低外部依赖，未来可扩展为从配置中心动态加载。

use crate::models::{SchoolSignupStatus, VendorSignupStatus};

/// 邮件签名方
const ORGANIZATION_NAME: &str = "Global Bright Futures Foundation Inc.";

/// 邮件模板
///
/// 每个变体对应一类审批结果通知，收件内容为面向学校/商户的英文文案
#[derive(Debug, Clone)]
pub enum EmailTemplate {
    /// 奖学金申请批准（带兑换码时附上码与金额）
    ApplicationApproved {
        student_name: String,
        school_name: String,
        program_type: String,
        voucher_code: Option<String>,
        amount: Option<i64>,
    },
    /// 奖学金申请拒绝
    ApplicationRejected { student_name: String },
    /// 学校注册审核结果
    SchoolSignupReviewed {
        school_name: String,
        status: SchoolSignupStatus,
    },
    /// 商户注册审核结果
    VendorSignupReviewed {
        vendor_name: String,
        status: VendorSignupStatus,
    },
    /// 拨款申请批准
    VoucherRequestApproved {
        school_name: String,
        purpose: String,
        voucher_code: String,
        amount: i64,
    },
    /// 拨款申请拒绝
    VoucherRequestRejected {
        school_name: String,
        purpose: String,
    },
}

impl EmailTemplate {
    /// 渲染邮件标题
    pub fn subject(&self) -> String {
        match self {
            Self::ApplicationApproved { .. } => {
                "🎉 Your Scholarship Application Has Been Approved!".to_string()
            }
            Self::ApplicationRejected { .. } => "Scholarship Application Update".to_string(),
            Self::SchoolSignupReviewed { status, .. } => match status {
                SchoolSignupStatus::Approved => {
                    "Your School Registration Has Been Approved".to_string()
                }
                SchoolSignupStatus::Waitlisted => {
                    "Your School Registration Has Been Waitlisted".to_string()
                }
                _ => "School Registration Update".to_string(),
            },
            Self::VendorSignupReviewed { .. } => "Vendor Account Status Update".to_string(),
            Self::VoucherRequestApproved { .. } => {
                "🎉 Your Voucher Request Has Been Approved!".to_string()
            }
            Self::VoucherRequestRejected { .. } => "Voucher Request Update".to_string(),
        }
    }

    /// 渲染 HTML 正文
    pub fn render_html(&self) -> String {
        match self {
            Self::ApplicationApproved {
                student_name,
                school_name,
                program_type,
                voucher_code,
                amount,
            } => {
                let voucher_block = match (voucher_code, amount) {
                    (Some(code), Some(amount)) => format!(
                        r#"<div style="background: white; padding: 20px; border-radius: 8px; margin: 20px 0; border-left: 4px solid #10b981;">
              <p style="margin: 5px 0;"><strong>Voucher Code:</strong> <span style="font-family: monospace;">{code}</span></p>
              <p style="margin: 5px 0;"><strong>Amount:</strong> ${amount}</p>
            </div>"#
                    ),
                    _ => String::new(),
                };

                wrap_html(&format!(
                    r#"<h1 style="margin-top: 0;">Congratulations, {student_name}!</h1>
            <p style="font-size: 18px;">
              We are thrilled to inform you that your scholarship application has been <strong style="color: #10b981;">approved</strong>!
            </p>
            <div style="background: white; padding: 20px; border-radius: 8px; margin: 20px 0; border-left: 4px solid #10b981;">
              <p style="margin: 5px 0;"><strong>School:</strong> {school_name}</p>
              <p style="margin: 5px 0;"><strong>Program:</strong> {program_type}</p>
            </div>
            {voucher_block}
            <p>
              Our team will be in touch with you shortly to discuss the next steps and provide you with more details about your scholarship.
            </p>"#
                ))
            }
            Self::ApplicationRejected { student_name } => wrap_html(&format!(
                r#"<h2 style="margin-top: 0;">Scholarship Application Update</h2>
            <p>Dear {student_name},</p>
            <p>
              Thank you for your interest in our scholarship program. After careful review, we regret to inform you that we are unable to approve your application at this time.
            </p>
            <p>
              We encourage you to apply again in the future, as our programs and availability may change.
            </p>"#
            )),
            Self::SchoolSignupReviewed {
                school_name,
                status,
            } => {
                let body = match status {
                    SchoolSignupStatus::Approved => format!(
                        "We are pleased to inform you that the registration for <strong>{school_name}</strong> has been approved. You can now sign in and submit scholarship applications."
                    ),
                    SchoolSignupStatus::Waitlisted => format!(
                        "The registration for <strong>{school_name}</strong> has been waitlisted. We'll contact you when a spot becomes available."
                    ),
                    _ => format!(
                        "After careful review, we are unable to approve the registration for <strong>{school_name}</strong> at this time."
                    ),
                };
                wrap_html(&format!(
                    r#"<h2 style="margin-top: 0;">School Registration Update</h2><p>{body}</p>"#
                ))
            }
            Self::VendorSignupReviewed {
                vendor_name,
                status,
            } => {
                let body = match status {
                    VendorSignupStatus::Active => format!(
                        "The vendor account for <strong>{vendor_name}</strong> is now active. You can start submitting voucher codes for redemption."
                    ),
                    VendorSignupStatus::Approved => format!(
                        "The vendor account for <strong>{vendor_name}</strong> has been approved and will be activated shortly."
                    ),
                    VendorSignupStatus::Suspended => format!(
                        "The vendor account for <strong>{vendor_name}</strong> has been suspended. Please contact us for details."
                    ),
                    _ => format!(
                        "The vendor account for <strong>{vendor_name}</strong> is currently under review."
                    ),
                };
                wrap_html(&format!(
                    r#"<h2 style="margin-top: 0;">Vendor Account Status Update</h2><p>{body}</p>"#
                ))
            }
            Self::VoucherRequestApproved {
                school_name,
                purpose,
                voucher_code,
                amount,
            } => wrap_html(&format!(
                r#"<h2 style="margin-top: 0;">Voucher Request Approved</h2>
            <p>
              Good news! The voucher request from <strong>{school_name}</strong> has been approved.
            </p>
            <div style="background: white; padding: 20px; border-radius: 8px; margin: 20px 0; border-left: 4px solid #10b981;">
              <p style="margin: 5px 0;"><strong>Voucher Code:</strong> <span style="font-family: monospace;">{voucher_code}</span></p>
              <p style="margin: 5px 0;"><strong>Amount:</strong> ${amount}</p>
              <p style="margin: 5px 0;"><strong>Purpose:</strong> {purpose}</p>
            </div>"#
            )),
            Self::VoucherRequestRejected {
                school_name,
                purpose,
            } => wrap_html(&format!(
                r#"<h2 style="margin-top: 0;">Voucher Request Update</h2>
            <p>
              After careful review, we are unable to approve the voucher request from <strong>{school_name}</strong> for "{purpose}" at this time.
            </p>"#
            )),
        }
    }
}

/// 包裹统一的邮件外层布局与落款
fn wrap_html(inner: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
  </head>
  <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: #f9f9f9; padding: 30px; border-radius: 10px; border: 1px solid #e0e0e0;">
      {inner}
      <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #e0e0e0;">
        <p style="color: #666; font-size: 14px;">
          Best regards,<br>
          <strong>{ORGANIZATION_NAME}</strong>
        </p>
      </div>
    </div>
  </body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_approved_includes_code_and_amount() {
        let template = EmailTemplate::ApplicationApproved {
            student_name: "Amara Osei".to_string(),
            school_name: "Riverside Academy".to_string(),
            program_type: "STEM Program".to_string(),
            voucher_code: Some("GBF-AB3X-9Q7K".to_string()),
            amount: Some(500),
        };

        assert!(template.subject().contains("Approved"));
        let html = template.render_html();
        assert!(html.contains("Amara Osei"));
        assert!(html.contains("GBF-AB3X-9Q7K"));
        assert!(html.contains("$500"));
        assert!(html.contains(ORGANIZATION_NAME));
    }

    #[test]
    fn test_application_approved_without_amount_omits_voucher_block() {
        let template = EmailTemplate::ApplicationApproved {
            student_name: "Amara Osei".to_string(),
            school_name: "Riverside Academy".to_string(),
            program_type: "STEM Program".to_string(),
            voucher_code: None,
            amount: None,
        };

        let html = template.render_html();
        assert!(!html.contains("Voucher Code:"));
    }

    #[test]
    fn test_application_rejected_body() {
        let template = EmailTemplate::ApplicationRejected {
            student_name: "Amara Osei".to_string(),
        };

        assert_eq!(template.subject(), "Scholarship Application Update");
        assert!(template.render_html().contains("unable to approve"));
    }

    #[test]
    fn test_school_signup_waitlisted_subject() {
        let template = EmailTemplate::SchoolSignupReviewed {
            school_name: "Riverside Academy".to_string(),
            status: SchoolSignupStatus::Waitlisted,
        };

        assert!(template.subject().contains("Waitlisted"));
        assert!(template.render_html().contains("waitlisted"));
    }

    #[test]
    fn test_voucher_request_approved_includes_purpose() {
        let template = EmailTemplate::VoucherRequestApproved {
            school_name: "Riverside Academy".to_string(),
            purpose: "Library books".to_string(),
            voucher_code: "GBF-W2YM-K4PD".to_string(),
            amount: 1200,
        };

        let html = template.render_html();
        assert!(html.contains("Library books"));
        assert!(html.contains("GBF-W2YM-K4PD"));
        assert!(html.contains("$1200"));
    }
}
