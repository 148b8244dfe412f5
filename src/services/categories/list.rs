use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CategoryService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::internal_error;

pub async fn list_categories(
    service: &CategoryService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_categories().await {
        Ok(categories) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(categories, "Category list retrieved successfully").at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to retrieve category list: {e}"),
        )),
    }
}
