use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{RoleService, find_role};
use crate::models::roles::entities::{
    ROLE_IN_USE_MESSAGE, RoleDeletion, SYSTEM_ROLE_PROTECTED_MESSAGE, is_system_role,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{bad_request, internal_error, invalidate_cached_users, not_found};

pub async fn delete_role(
    service: &RoleService,
    role_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let role = match find_role(&storage, role_id, request).await {
        Ok(role) => role,
        Err(response) => return Ok(response),
    };

    if is_system_role(&role.name) {
        return Ok(bad_request(
            request,
            ErrorCode::SystemRoleProtected,
            SYSTEM_ROLE_PROTECTED_MESSAGE,
        ));
    }

    // 占用检查与删除在同一事务中完成
    match storage.delete_role(role_id).await {
        Ok(RoleDeletion::Deleted) => {
            invalidate_cached_users(request).await;
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success_empty("Role deleted successfully").at(request)))
        }
        Ok(RoleDeletion::InUse(count)) => {
            tracing::info!("Refusing to delete role {} held by {} user(s)", role.name, count);
            Ok(bad_request(request, ErrorCode::RoleInUse, ROLE_IN_USE_MESSAGE))
        }
        Ok(RoleDeletion::NotFound) => {
            Ok(not_found(request, ErrorCode::RoleNotFound, "Role not found"))
        }
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Role deletion failed: {e}"),
        )),
    }
}
