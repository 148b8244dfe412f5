use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CategoryService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{internal_error, not_found};

pub async fn delete_category(
    service: &CategoryService,
    category_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.delete_category(category_id).await {
        Ok(true) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success_empty("Category deleted successfully").at(request))),
        Ok(false) => Ok(not_found(
            request,
            ErrorCode::CategoryNotFound,
            "Category not found",
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Category deletion failed: {e}"),
        )),
    }
}
