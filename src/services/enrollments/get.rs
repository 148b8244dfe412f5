use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{EnrollmentService, is_course_tutor, load_enrollment};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{forbidden, internal_error, unauthorized};

pub async fn get_enrollment(
    service: &EnrollmentService,
    enrollment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized(request));
    };
    let storage = service.get_storage(request)?;

    let enrollment = match load_enrollment(&storage, enrollment_id, request).await {
        Ok(enrollment) => enrollment,
        Err(response) => return Ok(response),
    };

    let allowed = if user.is_admin() || enrollment.student_id == user.id {
        true
    } else {
        match is_course_tutor(&storage, &enrollment, &user).await {
            Ok(allowed) => allowed,
            Err(e) => {
                return Ok(internal_error(
                    request,
                    ErrorCode::InternalServerError,
                    format!("Failed to get course: {e}"),
                ));
            }
        }
    };
    if !allowed {
        return Ok(forbidden(request));
    }

    Ok(HttpResponse::Ok()
        .json(ApiResponse::success(enrollment, "Enrollment retrieved successfully").at(request)))
}
