pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::ErrorCode;
use crate::models::enrollments::entities::Enrollment;
use crate::models::enrollments::requests::{
    CreateEnrollmentRequest, EnrollmentListParams, EnrollmentScope, UpdateEnrollmentRequest,
};
use crate::models::roles::entities::ROLE_TUTOR;
use crate::models::users::entities::User;
use crate::services::common::{internal_error, not_found};
use crate::storage::Storage;

pub struct EnrollmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl EnrollmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::common::storage_from(request),
        }
    }

    pub async fn list_enrollments(
        &self,
        query: EnrollmentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_enrollments(self, query, request).await
    }

    pub async fn create_enrollment(
        &self,
        body: CreateEnrollmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_enrollment(self, body, request).await
    }

    pub async fn get_enrollment(
        &self,
        enrollment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_enrollment(self, enrollment_id, request).await
    }

    pub async fn update_enrollment(
        &self,
        enrollment_id: i64,
        update: UpdateEnrollmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_enrollment(self, enrollment_id, update, request).await
    }

    pub async fn delete_enrollment(
        &self,
        enrollment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_enrollment(self, enrollment_id, request).await
    }
}

/// 当前用户可见的选课范围
pub(crate) fn scope_for(user: &User) -> EnrollmentScope {
    if user.is_admin() {
        EnrollmentScope::All
    } else if user.has_role(ROLE_TUTOR) {
        EnrollmentScope::Tutor(user.id)
    } else {
        EnrollmentScope::Student(user.id)
    }
}

pub(crate) async fn load_enrollment(
    storage: &Arc<dyn Storage>,
    enrollment_id: i64,
    request: &HttpRequest,
) -> Result<Enrollment, HttpResponse> {
    match storage.get_enrollment_by_id(enrollment_id).await {
        Ok(Some(enrollment)) => Ok(enrollment),
        Ok(None) => Err(not_found(
            request,
            ErrorCode::EnrollmentNotFound,
            "Enrollment not found",
        )),
        Err(e) => Err(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to get enrollment: {e}"),
        )),
    }
}

/// 当前用户是否为选课所在课程的导师
pub(crate) async fn is_course_tutor(
    storage: &Arc<dyn Storage>,
    enrollment: &Enrollment,
    user: &User,
) -> crate::errors::Result<bool> {
    if !user.has_role(ROLE_TUTOR) {
        return Ok(false);
    }
    Ok(storage
        .get_course_by_id(enrollment.course_id)
        .await?
        .is_some_and(|course| course.is_owned_by(user.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::fixtures::user_with_roles;

    #[test]
    fn test_scope_for_roles() {
        assert_eq!(scope_for(&user_with_roles(1, &["admin"])), EnrollmentScope::All);
        assert_eq!(
            scope_for(&user_with_roles(2, &["tutor"])),
            EnrollmentScope::Tutor(2)
        );
        assert_eq!(
            scope_for(&user_with_roles(3, &["student"])),
            EnrollmentScope::Student(3)
        );
        assert_eq!(
            scope_for(&user_with_roles(4, &["parent"])),
            EnrollmentScope::Student(4)
        );
    }
}
