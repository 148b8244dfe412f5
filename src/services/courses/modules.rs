use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, can_manage, can_view, load_course, load_managed_course, load_module};
use crate::models::courses::requests::{CreateModuleRequest, UpdateModuleRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{forbidden, internal_error, not_found, validation_failed};
use crate::utils::validate::ValidateRequest;

pub async fn list_modules(
    service: &CourseService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    match load_course(&storage, course_id, request).await {
        Ok(course) if can_view(&course, request) => {}
        Ok(_) => return Ok(not_found(request, ErrorCode::CourseNotFound, "Course not found")),
        Err(response) => return Ok(response),
    }

    match storage.list_modules(course_id).await {
        Ok(modules) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(modules, "Module list retrieved successfully").at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to retrieve module list: {e}"),
        )),
    }
}

pub async fn create_module(
    service: &CourseService,
    course_id: i64,
    mut module: CreateModuleRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    module.title = module.title.trim().to_string();
    if let Err(msg) = module.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let storage = service.get_storage(request)?;
    if let Err(response) = load_managed_course(&storage, course_id, request).await {
        return Ok(response);
    }

    match storage.create_module(course_id, module).await {
        Ok(module) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(module, "Module created successfully").at(request))),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Module creation failed: {e}"),
        )),
    }
}

pub async fn update_module(
    service: &CourseService,
    module_id: i64,
    mut update: UpdateModuleRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    update.title = update.title.map(|title| title.trim().to_string());
    if let Err(msg) = update.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let storage = service.get_storage(request)?;
    match load_module(&storage, module_id, request).await {
        Ok((_, course)) if can_manage(&course, request) => {}
        Ok(_) => return Ok(forbidden(request)),
        Err(response) => return Ok(response),
    }

    match storage.update_module(module_id, update).await {
        Ok(Some(module)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(module, "Module updated successfully").at(request))),
        Ok(None) => Ok(not_found(
            request,
            ErrorCode::CourseModuleNotFound,
            "Module not found",
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Module update failed: {e}"),
        )),
    }
}

pub async fn delete_module(
    service: &CourseService,
    module_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    match load_module(&storage, module_id, request).await {
        Ok((_, course)) if can_manage(&course, request) => {}
        Ok(_) => return Ok(forbidden(request)),
        Err(response) => return Ok(response),
    }

    match storage.delete_module(module_id).await {
        Ok(true) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success_empty("Module deleted successfully").at(request))),
        Ok(false) => Ok(not_found(
            request,
            ErrorCode::CourseModuleNotFound,
            "Module not found",
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Module deletion failed: {e}"),
        )),
    }
}
