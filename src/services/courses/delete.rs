use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, load_managed_course};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{internal_error, not_found};

pub async fn delete_course(
    service: &CourseService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    if let Err(response) = load_managed_course(&storage, course_id, request).await {
        return Ok(response);
    }

    match storage.delete_course(course_id).await {
        Ok(true) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success_empty("Course deleted successfully").at(request))),
        Ok(false) => Ok(not_found(request, ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Course deletion failed: {e}"),
        )),
    }
}
