use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, ensure_category, ensure_tutor};
use crate::middlewares::RequireJWT;
use crate::models::courses::requests::CreateCourseRequest;
use crate::models::roles::entities::ROLE_TUTOR;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{forbidden, internal_error, unauthorized, validation_failed};
use crate::utils::validate::ValidateRequest;

pub async fn create_course(
    service: &CourseService,
    mut course: CreateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized(request));
    };

    course.title = course.title.trim().to_string();
    if let Err(msg) = course.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    // 导师只能为自己创建课程
    if !user.is_admin() {
        if !user.has_role(ROLE_TUTOR) {
            return Ok(forbidden(request));
        }
        course.tutor_id = Some(user.id);
    }

    let storage = service.get_storage(request)?;

    if let Err(response) = ensure_category(&storage, course.category_id, request).await {
        return Ok(response);
    }
    if let Err(response) = ensure_tutor(&storage, course.tutor_id, request).await {
        return Ok(response);
    }

    match storage.create_course(course).await {
        Ok(course) => {
            tracing::info!("Course {} created by user {}", course.id, user.id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(course, "Course created successfully").at(request)))
        }
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Course creation failed: {e}"),
        )),
    }
}
