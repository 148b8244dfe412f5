use serde::Deserialize;
use validator::Validate;

use crate::models::common::PaginationQuery;
use crate::utils::validate::{ValidateRequest, validate_permission_code, validate_role_name};

// 角色列表查询参数
#[derive(Debug, Deserialize)]
pub struct RoleListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

// 创建角色请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[validate(custom(function = "validate_role_name"))]
    pub name: String,
    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: Option<String>,
}

impl ValidateRequest for CreateRoleRequest {
    const FIELD_ORDER: &'static [&'static str] = &["name", "description"];
}

// 更新角色请求
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[validate(custom(function = "validate_role_name"))]
    pub name: Option<String>,
    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: Option<String>,
}

impl ValidateRequest for UpdateRoleRequest {
    const FIELD_ORDER: &'static [&'static str] = &["name", "description"];
}

// 为角色分配权限
#[derive(Debug, Deserialize, Validate)]
pub struct AssignPermissionsRequest {
    #[validate(length(min = 1, message = "permission_ids must not be empty"))]
    pub permission_ids: Vec<i64>,
}

impl ValidateRequest for AssignPermissionsRequest {
    const FIELD_ORDER: &'static [&'static str] = &["permission_ids"];
}

// 权限列表查询参数
#[derive(Debug, Deserialize)]
pub struct PermissionListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

// 创建权限请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePermissionRequest {
    #[validate(custom(function = "validate_permission_code"))]
    pub code: String,
    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: Option<String>,
}

impl ValidateRequest for CreatePermissionRequest {
    const FIELD_ORDER: &'static [&'static str] = &["code", "description"];
}
