use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::BTreeSet;

use super::{RoleService, find_role};
use crate::models::roles::requests::AssignPermissionsRequest;
use crate::models::roles::responses::AssignPermissionsResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{
    forbidden, internal_error, invalidate_cached_users, is_admin, not_found, validation_failed,
};
use crate::utils::validate::ValidateRequest;

pub async fn assign_permissions(
    service: &RoleService,
    role_id: i64,
    body: AssignPermissionsRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if !is_admin(request) {
        return Ok(forbidden(request));
    }
    if let Err(msg) = body.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let storage = service.get_storage(request)?;
    if let Err(response) = find_role(&storage, role_id, request).await {
        return Ok(response);
    }

    let requested: BTreeSet<i64> = body.permission_ids.iter().copied().collect();
    let ids: Vec<i64> = requested.iter().copied().collect();
    let found = match storage.get_permissions_by_ids(&ids).await {
        Ok(found) => found,
        Err(e) => {
            return Ok(internal_error(
                request,
                ErrorCode::InternalServerError,
                format!("Failed to load permissions: {e}"),
            ));
        }
    };

    let found_ids: BTreeSet<i64> = found.iter().map(|p| p.id).collect();
    let missing: Vec<String> = requested
        .difference(&found_ids)
        .map(|id| id.to_string())
        .collect();
    if !missing.is_empty() {
        return Ok(not_found(
            request,
            ErrorCode::PermissionNotFound,
            format!("Permission not found: {}", missing.join(", ")),
        ));
    }

    let granted = match storage.assign_permissions_to_role(role_id, &ids).await {
        Ok(granted) => granted,
        Err(e) => {
            return Ok(internal_error(
                request,
                ErrorCode::InternalServerError,
                format!("Failed to assign permissions: {e}"),
            ));
        }
    };
    if granted > 0 {
        invalidate_cached_users(request).await;
    }

    match storage.list_role_permissions(role_id).await {
        Ok(permissions) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(
                AssignPermissionsResponse {
                    role_id,
                    granted,
                    permissions,
                },
                "Permissions assigned successfully",
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

pub async fn revoke_permission(
    service: &RoleService,
    role_id: i64,
    permission_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if !is_admin(request) {
        return Ok(forbidden(request));
    }

    let storage = service.get_storage(request)?;
    if let Err(response) = find_role(&storage, role_id, request).await {
        return Ok(response);
    }

    match storage
        .revoke_permission_from_role(role_id, permission_id)
        .await
    {
        Ok(true) => {
            invalidate_cached_users(request).await;
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success_empty("Permission revoked successfully").at(request)))
        }
        Ok(false) => Ok(not_found(
            request,
            ErrorCode::PermissionNotAssigned,
            "Permission is not assigned to this role",
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to revoke permission: {e}"),
        )),
    }
}
