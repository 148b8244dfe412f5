use once_cell::sync::Lazy;
use regex::Regex;
use validator::{Validate, ValidationError, ValidationErrors};

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").expect("Invalid username regex"));

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("Invalid phone regex"));

static ROLE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]{1,49}$").expect("Invalid role name regex"));

static PERMISSION_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9_]*\.[a-z][a-z0-9_]*$").expect("Invalid permission code regex")
});

pub const USERNAME_MESSAGE: &str =
    "Username must be 3-32 characters and contain only letters, digits, '.', '_' or '-'";
pub const EMAIL_MESSAGE: &str = "Please provide a valid email address";
pub const PHONE_MESSAGE: &str = "Phone number must be 7-15 digits, optionally starting with '+'";
pub const PASSWORD_MESSAGE: &str =
    "Password must be at least 8 characters and include upper-case, lower-case letters and a digit";

/// 请求体校验
///
/// 多个字段同时出错时，按 `FIELD_ORDER` 取第一个出错字段的消息。
pub trait ValidateRequest: Validate {
    const FIELD_ORDER: &'static [&'static str];

    fn validate_request(&self) -> Result<(), String> {
        self.validate()
            .map_err(|errors| first_error_message(&errors, Self::FIELD_ORDER))
    }
}

/// 取第一个出错字段的可读消息
pub fn first_error_message(errors: &ValidationErrors, field_order: &[&str]) -> String {
    let field_errors = errors.field_errors();

    let field = field_order
        .iter()
        .copied()
        .find(|field| field_errors.contains_key(*field))
        .or_else(|| {
            // 不在顺序表中的字段按名称排序，保证结果稳定
            let mut fields: Vec<&str> = field_errors.keys().copied().collect();
            fields.sort_unstable();
            fields.first().copied()
        });

    field
        .and_then(|field| {
            field_errors
                .get(field)
                .and_then(|errs| errs.first())
                .map(|error| message_for(field, error))
        })
        .unwrap_or_else(|| "Invalid request".to_string())
}

fn message_for(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    match field {
        "username" => USERNAME_MESSAGE.to_string(),
        "email" | "to" => EMAIL_MESSAGE.to_string(),
        "phone" => PHONE_MESSAGE.to_string(),
        "password" => PASSWORD_MESSAGE.to_string(),
        _ => match error.code.as_ref() {
            "length" => format!("{field} has an invalid length"),
            "range" => format!("{field} is out of range"),
            "url" => format!("{field} must be a valid URL"),
            "email" => EMAIL_MESSAGE.to_string(),
            _ => format!("{field} is invalid"),
        },
    }
}

/// 用户名：3-32 位字母、数字、`.`、`_` 或 `-`
pub fn validate_username_format(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::new("username"))
    }
}

/// 手机号：7-15 位数字，可带 `+` 前缀
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("phone"))
    }
}

/// 密码策略，消息为第一条不满足的规则
pub fn validate_password_policy(password: &str) -> Result<(), ValidationError> {
    let result = validate_password(password);
    match result.errors.first() {
        None => Ok(()),
        Some(first) => {
            let mut error = ValidationError::new("password_policy");
            error.message = Some((*first).into());
            Err(error)
        }
    }
}

/// 角色名：小写字母开头，2-50 位小写字母、数字或下划线
pub fn validate_role_name(name: &str) -> Result<(), ValidationError> {
    if ROLE_NAME_RE.is_match(name) {
        Ok(())
    } else {
        let mut error = ValidationError::new("role_name");
        error.message = Some(
            "Role name must be 2-50 lower-case letters, digits or underscores, starting with a letter"
                .into(),
        );
        Err(error)
    }
}

/// 权限代码：`resource.action`
pub fn validate_permission_code(code: &str) -> Result<(), ValidationError> {
    if code.len() <= 100 && PERMISSION_CODE_RE.is_match(code) {
        Ok(())
    } else {
        let mut error = ValidationError::new("permission_code");
        error.message = Some("Permission code must look like 'resource.action'".into());
        Err(error)
    }
}

/// ISO 3166-1 alpha-2 国家代码
pub fn validate_iso_country_code(code: &str) -> Result<(), ValidationError> {
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("iso_code");
        error.message = Some("ISO code must be two upper-case letters".into());
        Err(error)
    }
}

/// 密码策略验证结果
#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

/// 验证密码是否符合安全策略
///
/// 策略要求：
/// - 最小长度：8 字符
/// - 必须包含：大写字母 + 小写字母 + 数字
/// - 不能是常见弱密码
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters long");
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }

    let weak_passwords = [
        "password1",
        "qwerty123",
        "admin1234",
        "abcd1234",
        "welcome1",
        "letmein1",
    ];
    if weak_passwords
        .iter()
        .any(|&weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_format() {
        assert!(validate_username_format("jane.doe_01").is_ok());
        assert!(validate_username_format("ab").is_err());
        assert!(validate_username_format("has space").is_err());
        assert!(validate_username_format(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_phone_format() {
        assert!(validate_phone("+4915112345678").is_ok());
        assert!(validate_phone("5551234").is_ok());
        assert!(validate_phone("555-1234").is_err());
        assert!(validate_phone("+1234567890123456").is_err());
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password("SecureP@ss1").is_valid);
        assert!(validate_password("SecurePass123").is_valid);
    }

    #[test]
    fn test_password_rules() {
        let result = validate_password("Ab1");
        assert!(
            result
                .errors
                .contains(&"Password must be at least 8 characters long")
        );

        let result = validate_password("abcd12345");
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one uppercase letter")
        );

        let result = validate_password("Password1");
        assert!(
            result
                .errors
                .contains(&"Password is too common, please choose a stronger password")
        );
    }

    #[test]
    fn test_password_policy_uses_first_rule() {
        let err = validate_password_policy("short").unwrap_err();
        assert_eq!(
            err.message.as_deref(),
            Some("Password must be at least 8 characters long")
        );
    }

    #[test]
    fn test_permission_code() {
        assert!(validate_permission_code("courses.manage").is_ok());
        assert!(validate_permission_code("courses").is_err());
        assert!(validate_permission_code("Courses.Manage").is_err());
    }

    #[test]
    fn test_iso_country_code() {
        assert!(validate_iso_country_code("DE").is_ok());
        assert!(validate_iso_country_code("de").is_err());
        assert!(validate_iso_country_code("DEU").is_err());
    }
}
