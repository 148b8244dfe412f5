use serde::Serialize;

use super::entities::{Permission, Role};
use crate::models::common::PaginatedResponse;

pub type RoleListResponse = PaginatedResponse<Role>;

pub type PermissionListResponse = PaginatedResponse<Permission>;

// 分配权限结果
#[derive(Debug, Serialize)]
pub struct AssignPermissionsResponse {
    pub role_id: i64,
    /// 新增的授权数量（已存在的不重复计数）
    pub granted: u64,
    pub permissions: Vec<Permission>,
}
