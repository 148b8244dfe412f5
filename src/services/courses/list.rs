use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::middlewares::RequireJWT;
use crate::models::courses::entities::CourseStatus;
use crate::models::courses::requests::{CourseListParams, CourseListQuery};
use crate::models::roles::entities::STAFF_ROLES;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::internal_error;

pub async fn list_courses(
    service: &CourseService,
    query: CourseListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let mut query = CourseListQuery::from(query);
    // 学生和家长只能浏览已发布的课程
    if !RequireJWT::has_any_role(request, STAFF_ROLES) {
        query.status = Some(CourseStatus::Published);
    }

    match storage.list_courses_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(response, "Course list retrieved successfully").at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to retrieve course list: {e}"),
        )),
    }
}
