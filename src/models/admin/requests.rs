use serde::Deserialize;
use validator::Validate;

use crate::utils::validate::ValidateRequest;

// 测试邮件请求
#[derive(Debug, Deserialize, Validate)]
pub struct TestEmailRequest {
    #[validate(email)]
    pub to: String,
    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: Option<String>,
    pub body: Option<String>,
}

impl ValidateRequest for TestEmailRequest {
    const FIELD_ORDER: &'static [&'static str] = &["to", "subject"];
}
