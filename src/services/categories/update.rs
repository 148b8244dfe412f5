use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CategoryService, name_taken};
use crate::models::courses::requests::UpdateCategoryRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{bad_request, internal_error, not_found, validation_failed};
use crate::utils::validate::ValidateRequest;

pub async fn update_category(
    service: &CategoryService,
    category_id: i64,
    mut update: UpdateCategoryRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    update.name = update.name.map(|name| name.trim().to_string());
    if let Err(msg) = update.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let storage = service.get_storage(request)?;

    if let Some(name) = &update.name {
        match name_taken(&storage, name, Some(category_id)).await {
            Ok(true) => {
                return Ok(bad_request(
                    request,
                    ErrorCode::CategoryAlreadyExists,
                    "Category name already exists",
                ));
            }
            Ok(false) => {}
            Err(e) => {
                return Ok(internal_error(
                    request,
                    ErrorCode::InternalServerError,
                    format!("Category update failed: {e}"),
                ));
            }
        }
    }

    match storage.update_category(category_id, update).await {
        Ok(Some(category)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(category, "Category updated successfully").at(request))),
        Ok(None) => Ok(not_found(
            request,
            ErrorCode::CategoryNotFound,
            "Category not found",
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Category update failed: {e}"),
        )),
    }
}
