use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RoleService;
use crate::models::roles::requests::CreateRoleRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{bad_request, internal_error, validation_failed};
use crate::utils::validate::ValidateRequest;

pub async fn create_role(
    service: &RoleService,
    mut role: CreateRoleRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    role.name = role.name.trim().to_string();
    if let Err(msg) = role.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let storage = service.get_storage(request)?;

    match storage.get_role_by_name(&role.name).await {
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
                format!("Role creation failed: {e}"),
            ));
        }
    }

    match storage.create_role(role).await {
        Ok(role) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(role, "Role created successfully").at(request))),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Role creation failed: {e}"),
        )),
    }
}
