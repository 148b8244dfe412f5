//! 账户相关的邮件内容

use super::message::EmailMessage;
use crate::config::AppConfig;
use crate::models::users::entities::User;

/// 自助注册后的欢迎邮件
pub fn welcome_email(user: &User) -> EmailMessage {
    let system_name = &AppConfig::get().app.system_name;
    EmailMessage::new(
        user.email.clone(),
        format!("Welcome to {system_name}"),
        format!(
            "Hi {},\n\nYour {system_name} account '{}' is ready. You can sign in now.\n",
            user.display_name(),
            user.username
        ),
    )
}

/// 管理员代为创建账户时的通知
pub fn account_created_email(user: &User) -> EmailMessage {
    let system_name = &AppConfig::get().app.system_name;
    EmailMessage::new(
        user.email.clone(),
        format!("Your {system_name} account"),
        format!(
            "Hi {},\n\nAn administrator created a {system_name} account for you.\nUsername: {}\nRoles: {}\n\nPlease sign in and change your password.\n",
            user.display_name(),
            user.username,
            user.roles.join(", ")
        ),
    )
}

/// 管理后台的测试邮件
pub fn test_email(to: &str, subject: Option<&str>, body: Option<&str>) -> EmailMessage {
    let system_name = &AppConfig::get().app.system_name;
    EmailMessage::new(
        to,
        subject
            .map(str::to_string)
            .unwrap_or_else(|| format!("{system_name} test email")),
        body.map(str::to_string)
            .unwrap_or_else(|| format!("This is a test email from {system_name}.")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::fixtures::user_with_roles;

    #[test]
    fn test_welcome_email_addresses_user() {
        let user = user_with_roles(3, &["student"]);
        let email = welcome_email(&user);
        assert_eq!(email.to, "user3@example.com");
        assert!(email.text.contains("user3"));
    }

    #[test]
    fn test_test_email_defaults() {
        let email = test_email("ops@example.com", None, Some("ping"));
        assert!(email.subject.ends_with("test email"));
        assert_eq!(email.text, "ping");
    }
}
