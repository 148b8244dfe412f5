use super::entities::Enrollment;
use crate::models::common::PaginatedResponse;

pub type EnrollmentListResponse = PaginatedResponse<Enrollment>;
