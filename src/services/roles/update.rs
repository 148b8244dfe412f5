use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{RoleService, find_role};
use crate::models::roles::entities::{SYSTEM_ROLE_PROTECTED_MESSAGE, is_system_role};
use crate::models::roles::requests::UpdateRoleRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{
    bad_request, internal_error, invalidate_cached_users, not_found, validation_failed,
};
use crate::utils::validate::ValidateRequest;

pub async fn update_role(
    service: &RoleService,
    role_id: i64,
    mut update: UpdateRoleRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    update.name = update.name.map(|name| name.trim().to_string());
    if let Err(msg) = update.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let storage = service.get_storage(request)?;
    let role = match find_role(&storage, role_id, request).await {
        Ok(role) => role,
        Err(response) => return Ok(response),
    };

    if let Some(new_name) = &update.name
        && new_name != &role.name
    {
        // 系统角色只能修改描述
        if is_system_role(&role.name) {
            return Ok(bad_request(
                request,
                ErrorCode::SystemRoleProtected,
                SYSTEM_ROLE_PROTECTED_MESSAGE,
            ));
        }

        match storage.get_role_by_name(new_name).await {
            Ok(Some(_)) => {
                return Ok(bad_request(
                    request,
                    ErrorCode::RoleAlreadyExists,
                    "Role name already exists",
                ));
            }
            Ok(None) => {}
            Err(e) => {
                return Ok(internal_error(
                    request,
                    ErrorCode::InternalServerError,
                    format!("Role update failed: {e}"),
                ));
            }
        }
    }

    match storage.update_role(role_id, update).await {
        Ok(Some(role)) => {
            invalidate_cached_users(request).await;
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success(role, "Role updated successfully").at(request)))
        }
        Ok(None) => Ok(not_found(request, ErrorCode::RoleNotFound, "Role not found")),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Role update failed: {e}"),
        )),
    }
}
