use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, can_view};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{internal_error, not_found};

pub async fn get_course(
    service: &CourseService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_course_detail(course_id).await {
        // 未发布的课程对无权管理的用户表现为不存在
        Ok(Some(detail)) if can_view(&detail.course, request) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(detail, "Course retrieved successfully").at(request))),
        Ok(_) => Ok(not_found(request, ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to get course: {e}"),
        )),
    }
}
