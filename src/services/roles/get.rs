use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{RoleService, find_role};
use crate::models::roles::entities::RoleWithPermissions;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::internal_error;

pub async fn get_role(
    service: &RoleService,
    role_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let role = match find_role(&storage, role_id, request).await {
        Ok(role) => role,
        Err(response) => return Ok(response),
    };

    match storage.list_role_permissions(role_id).await {
        Ok(permissions) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(
                RoleWithPermissions { role, permissions },
                "Role retrieved successfully",
            )
            .at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to list role permissions: {e}"),
        )),
    }
}
