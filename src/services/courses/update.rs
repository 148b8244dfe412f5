use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, ensure_category, ensure_tutor, load_managed_course};
use crate::models::courses::requests::UpdateCourseRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{
    forbidden, internal_error, is_admin, not_found, validation_failed,
};
use crate::utils::validate::ValidateRequest;

pub async fn update_course(
    service: &CourseService,
    course_id: i64,
    mut update: UpdateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    update.title = update.title.map(|title| title.trim().to_string());
    if let Err(msg) = update.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let storage = service.get_storage(request)?;
    let course = match load_managed_course(&storage, course_id, request).await {
        Ok(course) => course,
        Err(response) => return Ok(response),
    };

    // 只有管理员可以把课程转给其他导师
    if !is_admin(request) && update.tutor_id.is_some_and(|tutor_id| course.tutor_id != Some(tutor_id)) {
        return Ok(forbidden(request));
    }

    if let Err(response) = ensure_category(&storage, update.category_id, request).await {
        return Ok(response);
    }
    if let Err(response) = ensure_tutor(&storage, update.tutor_id, request).await {
        return Ok(response);
    }

    match storage.update_course(course_id, update).await {
        Ok(Some(course)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(course, "Course updated successfully").at(request))),
        Ok(None) => Ok(not_found(request, ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Course update failed: {e}"),
        )),
    }
}
