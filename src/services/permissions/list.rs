use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::PermissionService;
use crate::models::roles::requests::PermissionListParams;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::internal_error;

pub async fn list_permissions(
    service: &PermissionService,
    query: PermissionListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage
        .list_permissions_with_pagination(
            query.pagination.page(),
            query.pagination.page_size(),
            query.search,
        )
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(response, "Permission list retrieved successfully").at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to retrieve permission list: {e}"),
        )),
    }
}
