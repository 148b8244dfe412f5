use serde::Deserialize;
use validator::Validate;

use super::entities::UserStatus;
use crate::models::common::PaginationQuery;
use crate::utils::validate::{
    ValidateRequest, validate_password_policy, validate_phone, validate_username_format,
};

// 用户查询参数（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    /// 角色名称
    pub role: Option<String>,
    pub status: Option<UserStatus>,
    pub search: Option<String>,
}

// 用户创建请求（注册与管理员创建共用）
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(custom(function = "validate_username_format"))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_password_policy"))]
    pub password: String,
    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    /// 需要分配的角色，缺省时为 student
    #[serde(default)]
    pub role_ids: Option<Vec<i64>>,
}

impl ValidateRequest for CreateUserRequest {
    const FIELD_ORDER: &'static [&'static str] = &[
        "username",
        "email",
        "password",
        "first_name",
        "last_name",
        "phone",
    ];
}

// 用户更新请求
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "validate_username_format"))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom(function = "validate_password_policy"))]
    pub password: Option<String>,
    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub status: Option<UserStatus>,
}

impl ValidateRequest for UpdateUserRequest {
    const FIELD_ORDER: &'static [&'static str] = &[
        "username",
        "email",
        "password",
        "first_name",
        "last_name",
        "phone",
    ];
}

// 分配角色请求
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role_id: i64,
}

// 用户列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub page: i64,
    pub page_size: i64,
    pub role: Option<String>,
    pub status: Option<UserStatus>,
    pub search: Option<String>,
}

impl From<UserListParams> for UserListQuery {
    fn from(params: UserListParams) -> Self {
        Self {
            page: params.pagination.page(),
            page_size: params.pagination.page_size(),
            role: params.role.filter(|r| !r.trim().is_empty()),
            status: params.status,
            search: params.search,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateUserRequest {
        CreateUserRequest {
            username: "jane.doe".into(),
            email: "jane@example.com".into(),
            password: "Secret123".into(),
            first_name: Some("Jane".into()),
            last_name: None,
            phone: Some("+15551234567".into()),
            role_ids: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate_request().is_ok());
    }

    #[test]
    fn test_first_failing_field_wins() {
        let mut req = valid_request();
        req.email = "not-an-email".into();
        req.phone = Some("abc".into());
        let message = req.validate_request().unwrap_err();
        assert_eq!(message, "Please provide a valid email address");
    }

    #[test]
    fn test_custom_phrasing_for_phone_and_username() {
        let mut req = valid_request();
        req.phone = Some("12".into());
        assert_eq!(
            req.validate_request().unwrap_err(),
            "Phone number must be 7-15 digits, optionally starting with '+'"
        );

        let mut req = valid_request();
        req.username = "a b".into();
        assert_eq!(
            req.validate_request().unwrap_err(),
            "Username must be 3-32 characters and contain only letters, digits, '.', '_' or '-'"
        );
    }

    #[test]
    fn test_list_params_parse_from_query_string() {
        let params = actix_web::web::Query::<UserListParams>::from_query(
            "page=2&page_size=5&role=tutor&status=active",
        )
        .expect("query should parse")
        .into_inner();
        let query = UserListQuery::from(params);
        assert_eq!(query.page, 2);
        assert_eq!(query.page_size, 5);
        assert_eq!(query.role.as_deref(), Some("tutor"));
        assert_eq!(query.status, Some(UserStatus::Active));
    }
}
