use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CategoryService, name_taken};
use crate::models::courses::requests::CreateCategoryRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{bad_request, internal_error, validation_failed};
use crate::utils::validate::ValidateRequest;

pub async fn create_category(
    service: &CategoryService,
    mut category: CreateCategoryRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    category.name = category.name.trim().to_string();
    if let Err(msg) = category.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let storage = service.get_storage(request)?;

    match name_taken(&storage, &category.name, None).await {
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
                format!("Category creation failed: {e}"),
            ));
        }
    }

    match storage.create_category(category).await {
        Ok(category) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(category, "Category created successfully").at(request))),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Category creation failed: {e}"),
        )),
    }
}
