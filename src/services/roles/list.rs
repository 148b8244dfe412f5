use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RoleService;
use crate::models::roles::requests::RoleListParams;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::internal_error;

pub async fn list_roles(
    service: &RoleService,
    query: RoleListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage
        .list_roles_with_pagination(
            query.pagination.page(),
            query.pagination.page_size(),
            query.search,
        )
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(response, "Role list retrieved successfully").at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to retrieve role list: {e}"),
        )),
    }
}
