use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{EnrollmentService, scope_for};
use crate::middlewares::RequireJWT;
use crate::models::enrollments::requests::{EnrollmentListParams, EnrollmentListQuery};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{internal_error, unauthorized};

pub async fn list_enrollments(
    service: &EnrollmentService,
    params: EnrollmentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized(request));
    };
    let storage = service.get_storage(request)?;

    let query = EnrollmentListQuery {
        page: params.pagination.page(),
        page_size: params.pagination.page_size(),
        scope: scope_for(&user),
        course_id: params.course_id,
        student_id: params.student_id,
        status: params.status,
    };

    match storage.list_enrollments_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(response, "Enrollment list retrieved successfully").at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to retrieve enrollment list: {e}"),
        )),
    }
}
