use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{EnrollmentService, is_course_tutor, load_enrollment};
use crate::middlewares::RequireJWT;
use crate::models::enrollments::requests::UpdateEnrollmentRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{
    forbidden, internal_error, not_found, unauthorized, validation_failed,
};
use crate::utils::validate::ValidateRequest;

pub async fn update_enrollment(
    service: &EnrollmentService,
    enrollment_id: i64,
    update: UpdateEnrollmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized(request));
    };
    if let Err(msg) = update.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let storage = service.get_storage(request)?;
    let enrollment = match load_enrollment(&storage, enrollment_id, request).await {
        Ok(enrollment) => enrollment,
        Err(response) => return Ok(response),
    };

    if !user.is_admin() {
        match is_course_tutor(&storage, &enrollment, &user).await {
            Ok(true) => {}
            Ok(false) => return Ok(forbidden(request)),
            Err(e) => {
                return Ok(internal_error(
                    request,
                    ErrorCode::InternalServerError,
                    format!("Failed to get course: {e}"),
                ));
            }
        }
    }

    match storage.update_enrollment(enrollment_id, update).await {
        Ok(Some(enrollment)) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(enrollment, "Enrollment updated successfully").at(request),
        )),
        Ok(None) => Ok(not_found(
            request,
            ErrorCode::EnrollmentNotFound,
            "Enrollment not found",
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Enrollment update failed: {e}"),
        )),
    }
}
