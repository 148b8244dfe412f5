use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::PermissionService;
use crate::models::roles::requests::CreatePermissionRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{bad_request, internal_error, validation_failed};
use crate::utils::validate::ValidateRequest;

pub async fn create_permission(
    service: &PermissionService,
    mut permission: CreatePermissionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    permission.code = permission.code.trim().to_string();
    if let Err(msg) = permission.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let storage = service.get_storage(request)?;

    match storage.get_permission_by_code(&permission.code).await {
        Ok(Some(_)) => {
            return Ok(bad_request(
                request,
                ErrorCode::PermissionAlreadyExists,
                "Permission code already exists",
            ));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(internal_error(
                request,
                ErrorCode::InternalServerError,
                format!("Permission creation failed: {e}"),
            ));
        }
    }

    match storage.create_permission(permission).await {
        Ok(permission) => Ok(HttpResponse::Created().json(
            ApiResponse::success(permission, "Permission created successfully").at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Permission creation failed: {e}"),
        )),
    }
}
