use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{EnrollmentService, load_enrollment};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{forbidden, internal_error, not_found, unauthorized};

pub async fn delete_enrollment(
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
    // 学生只能取消自己的选课
    if !user.is_admin() && enrollment.student_id != user.id {
        return Ok(forbidden(request));
    }

    match storage.delete_enrollment(enrollment_id).await {
        Ok(true) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success_empty("Enrollment deleted successfully").at(request))),
        Ok(false) => Ok(not_found(
            request,
            ErrorCode::EnrollmentNotFound,
            "Enrollment not found",
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Enrollment deletion failed: {e}"),
        )),
    }
}
