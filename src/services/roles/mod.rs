pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod permissions;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::roles::requests::{
    AssignPermissionsRequest, CreateRoleRequest, RoleListParams, UpdateRoleRequest,
};
use crate::storage::Storage;

pub struct RoleService {
    storage: Option<Arc<dyn Storage>>,
}

impl RoleService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::common::storage_from(request),
        }
    }

    pub async fn list_roles(
        &self,
        query: RoleListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_roles(self, query, request).await
    }

    pub async fn get_role(&self, role_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_role(self, role_id, request).await
    }

    pub async fn create_role(
        &self,
        role: CreateRoleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_role(self, role, request).await
    }

    pub async fn update_role(
        &self,
        role_id: i64,
        update: UpdateRoleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_role(self, role_id, update, request).await
    }

    pub async fn delete_role(
        &self,
        role_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_role(self, role_id, request).await
    }

    // 为角色授权
    pub async fn assign_permissions(
        &self,
        role_id: i64,
        body: AssignPermissionsRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        permissions::assign_permissions(self, role_id, body, request).await
    }

    // 撤销角色的某项权限
    pub async fn revoke_permission(
        &self,
        role_id: i64,
        permission_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        permissions::revoke_permission(self, role_id, permission_id, request).await
    }
}

/// 查找角色，不存在时返回 404 响应
pub(crate) async fn find_role(
    storage: &Arc<dyn Storage>,
    role_id: i64,
    request: &HttpRequest,
) -> Result<crate::models::roles::entities::Role, HttpResponse> {
    use crate::models::ErrorCode;
    use crate::services::common::{internal_error, not_found};

    match storage.get_role_by_id(role_id).await {
        Ok(Some(role)) => Ok(role),
        Ok(None) => Err(not_found(request, ErrorCode::RoleNotFound, "Role not found")),
        Err(e) => Err(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to get role: {e}"),
        )),
    }
}
