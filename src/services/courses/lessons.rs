use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, can_manage, can_view, load_module};
use crate::models::courses::requests::{CreateLessonRequest, UpdateLessonRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{forbidden, internal_error, not_found, validation_failed};
use crate::utils::validate::ValidateRequest;

/// 加载课时所属章节，并检查管理权限
async fn ensure_lesson_manageable(
    service: &CourseService,
    lesson_id: i64,
    request: &HttpRequest,
) -> ActixResult<Result<(), HttpResponse>> {
    let storage = service.get_storage(request)?;
    let lesson = match storage.get_lesson_by_id(lesson_id).await {
        Ok(Some(lesson)) => lesson,
        Ok(None) => {
            return Ok(Err(not_found(
                request,
                ErrorCode::LessonNotFound,
                "Lesson not found",
            )));
        }
        Err(e) => {
            return Ok(Err(internal_error(
                request,
                ErrorCode::InternalServerError,
                format!("Failed to get lesson: {e}"),
            )));
        }
    };

    Ok(match load_module(&storage, lesson.module_id, request).await {
        Ok((_, course)) if can_manage(&course, request) => Ok(()),
        Ok(_) => Err(forbidden(request)),
        Err(_) => Err(not_found(
            request,
            ErrorCode::LessonNotFound,
            "Lesson not found",
        )),
    })
}

pub async fn list_lessons(
    service: &CourseService,
    module_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    match load_module(&storage, module_id, request).await {
        Ok((_, course)) if can_view(&course, request) => {}
        Ok(_) => {
            return Ok(not_found(
                request,
                ErrorCode::CourseModuleNotFound,
                "Module not found",
            ));
        }
        Err(response) => return Ok(response),
    }

    match storage.list_lessons(module_id).await {
        Ok(lessons) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(lessons, "Lesson list retrieved successfully").at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to retrieve lesson list: {e}"),
        )),
    }
}

pub async fn create_lesson(
    service: &CourseService,
    module_id: i64,
    mut lesson: CreateLessonRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    lesson.title = lesson.title.trim().to_string();
    if let Err(msg) = lesson.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let storage = service.get_storage(request)?;
    match load_module(&storage, module_id, request).await {
        Ok((_, course)) if can_manage(&course, request) => {}
        Ok(_) => return Ok(forbidden(request)),
        Err(response) => return Ok(response),
    }

    match storage.create_lesson(module_id, lesson).await {
        Ok(lesson) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(lesson, "Lesson created successfully").at(request))),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Lesson creation failed: {e}"),
        )),
    }
}

pub async fn update_lesson(
    service: &CourseService,
    lesson_id: i64,
    mut update: UpdateLessonRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    update.title = update.title.map(|title| title.trim().to_string());
    if let Err(msg) = update.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    if let Err(response) = ensure_lesson_manageable(service, lesson_id, request).await? {
        return Ok(response);
    }

    let storage = service.get_storage(request)?;
    match storage.update_lesson(lesson_id, update).await {
        Ok(Some(lesson)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(lesson, "Lesson updated successfully").at(request))),
        Ok(None) => Ok(not_found(
            request,
            ErrorCode::LessonNotFound,
            "Lesson not found",
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Lesson update failed: {e}"),
        )),
    }
}

pub async fn delete_lesson(
    service: &CourseService,
    lesson_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(response) = ensure_lesson_manageable(service, lesson_id, request).await? {
        return Ok(response);
    }

    let storage = service.get_storage(request)?;
    match storage.delete_lesson(lesson_id).await {
        Ok(true) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success_empty("Lesson deleted successfully").at(request))),
        Ok(false) => Ok(not_found(
            request,
            ErrorCode::LessonNotFound,
            "Lesson not found",
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Lesson deletion failed: {e}"),
        )),
    }
}
