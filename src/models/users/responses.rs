use serde::Serialize;

use super::entities::User;
use crate::models::common::PaginatedResponse;
use crate::models::roles::entities::Role;

// 用户响应
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

// 用户列表响应
pub type UserListResponse = PaginatedResponse<User>;

// 用户角色列表响应
#[derive(Debug, Serialize)]
pub struct UserRolesResponse {
    pub user_id: i64,
    pub roles: Vec<Role>,
}
