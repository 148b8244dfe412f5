use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EnrollmentService;
use crate::middlewares::RequireJWT;
use crate::models::courses::entities::CourseStatus;
use crate::models::enrollments::entities::EnrollmentStatus;
use crate::models::enrollments::requests::CreateEnrollmentRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{
    bad_request, forbidden, internal_error, not_found, unauthorized,
};

pub async fn create_enrollment(
    service: &EnrollmentService,
    body: CreateEnrollmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized(request));
    };
    let is_admin = user.is_admin();

    // 只有管理员可以替其他学生选课
    let student_id = match body.student_id {
        Some(student_id) if student_id != user.id && !is_admin => return Ok(forbidden(request)),
        Some(student_id) => student_id,
        None => user.id,
    };

    let storage = service.get_storage(request)?;

    let course = match storage.get_course_by_id(body.course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => return Ok(not_found(request, ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => {
            return Ok(internal_error(
                request,
                ErrorCode::InternalServerError,
                format!("Failed to get course: {e}"),
            ));
        }
    };
    if !is_admin && course.status != CourseStatus::Published {
        return Ok(bad_request(
            request,
            ErrorCode::CourseNotPublished,
            "Course is not open for enrollment",
        ));
    }

    if student_id != user.id {
        match storage.get_user_by_id(student_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Ok(not_found(request, ErrorCode::UserNotFound, "Student not found"));
            }
            Err(e) => {
                return Ok(internal_error(
                    request,
                    ErrorCode::InternalServerError,
                    format!("Failed to get student: {e}"),
                ));
            }
        }
    }

    match storage
        .get_enrollment_by_student_and_course(student_id, course.id)
        .await
    {
        Ok(Some(_)) => {
            return Ok(bad_request(
                request,
                ErrorCode::EnrollmentAlreadyExists,
                "Student is already enrolled in this course",
            ));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(internal_error(
                request,
                ErrorCode::InternalServerError,
                format!("Enrollment failed: {e}"),
            ));
        }
    }

    match storage
        .create_enrollment(student_id, course.id, EnrollmentStatus::Active)
        .await
    {
        Ok(enrollment) => Ok(HttpResponse::Created().json(
            ApiResponse::success(enrollment, "Enrollment created successfully").at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Enrollment failed: {e}"),
        )),
    }
}
