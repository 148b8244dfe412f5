use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{requests::AssignRoleRequest, responses::UserRolesResponse},
};
use crate::services::common::{internal_error, invalidate_cached_users, not_found};
use crate::storage::Storage;

// 用户不存在时返回 404 响应
async fn ensure_user(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    request: &HttpRequest,
) -> Result<(), HttpResponse> {
    match storage.get_user_by_id(user_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(not_found(request, ErrorCode::UserNotFound, "User not found")),
        Err(e) => Err(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to get user information: {e}"),
        )),
    }
}

async fn roles_response(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    message: &str,
    request: &HttpRequest,
) -> HttpResponse {
    match storage.list_user_roles(user_id).await {
        Ok(roles) => HttpResponse::Ok()
            .json(ApiResponse::success(UserRolesResponse { user_id, roles }, message).at(request)),
        Err(e) => internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to list user roles: {e}"),
        ),
    }
}

pub async fn list_user_roles(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    if let Err(response) = ensure_user(&storage, user_id, request).await {
        return Ok(response);
    }
    Ok(roles_response(&storage, user_id, "User roles retrieved successfully", request).await)
}

pub async fn assign_role(
    service: &UserService,
    user_id: i64,
    body: AssignRoleRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    if let Err(response) = ensure_user(&storage, user_id, request).await {
        return Ok(response);
    }

    match storage.get_role_by_id(body.role_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(request, ErrorCode::RoleNotFound, "Role not found")),
        Err(e) => {
            return Ok(internal_error(
                request,
                ErrorCode::InternalServerError,
                format!("Failed to get role: {e}"),
            ));
        }
    }

    match storage.assign_role_to_user(user_id, body.role_id).await {
        Ok(assigned) => {
            let message = if assigned {
                invalidate_cached_users(request).await;
                "Role assigned successfully"
            } else {
                "Role already assigned"
            };
            Ok(roles_response(&storage, user_id, message, request).await)
        }
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to assign role: {e}"),
        )),
    }
}

pub async fn revoke_role(
    service: &UserService,
    user_id: i64,
    role_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    if let Err(response) = ensure_user(&storage, user_id, request).await {
        return Ok(response);
    }

    match storage.revoke_role_from_user(user_id, role_id).await {
        Ok(true) => {
            invalidate_cached_users(request).await;
            Ok(roles_response(&storage, user_id, "Role revoked successfully", request).await)
        }
        Ok(false) => Ok(not_found(
            request,
            ErrorCode::RoleNotFound,
            "Role is not assigned to this user",
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to revoke role: {e}"),
        )),
    }
}
