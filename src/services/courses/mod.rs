pub mod create;
pub mod delete;
pub mod get;
pub mod lessons;
pub mod list;
pub mod modules;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::middlewares::RequireJWT;
use crate::models::ErrorCode;
use crate::models::courses::entities::{Course, CourseModule, CourseStatus};
use crate::models::courses::requests::{
    CourseListParams, CreateCourseRequest, CreateLessonRequest, CreateModuleRequest,
    UpdateCourseRequest, UpdateLessonRequest, UpdateModuleRequest,
};
use crate::models::roles::entities::ROLE_TUTOR;
use crate::services::common::{forbidden, internal_error, not_found, unauthorized};
use crate::storage::Storage;

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::common::storage_from(request),
        }
    }

    pub async fn list_courses(
        &self,
        query: CourseListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_courses(self, query, request).await
    }

    pub async fn get_course(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_course(self, course_id, request).await
    }

    pub async fn create_course(
        &self,
        course: CreateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_course(self, course, request).await
    }

    pub async fn update_course(
        &self,
        course_id: i64,
        update: UpdateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_course(self, course_id, update, request).await
    }

    pub async fn delete_course(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_course(self, course_id, request).await
    }

    // 章节
    pub async fn list_modules(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        modules::list_modules(self, course_id, request).await
    }

    pub async fn create_module(
        &self,
        course_id: i64,
        module: CreateModuleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        modules::create_module(self, course_id, module, request).await
    }

    pub async fn update_module(
        &self,
        module_id: i64,
        update: UpdateModuleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        modules::update_module(self, module_id, update, request).await
    }

    pub async fn delete_module(
        &self,
        module_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        modules::delete_module(self, module_id, request).await
    }

    // 课时
    pub async fn list_lessons(
        &self,
        module_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        lessons::list_lessons(self, module_id, request).await
    }

    pub async fn create_lesson(
        &self,
        module_id: i64,
        lesson: CreateLessonRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        lessons::create_lesson(self, module_id, lesson, request).await
    }

    pub async fn update_lesson(
        &self,
        lesson_id: i64,
        update: UpdateLessonRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        lessons::update_lesson(self, lesson_id, update, request).await
    }

    pub async fn delete_lesson(
        &self,
        lesson_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        lessons::delete_lesson(self, lesson_id, request).await
    }
}

/// 当前用户能否管理该课程：管理员或课程所属导师
pub(crate) fn can_manage(course: &Course, request: &HttpRequest) -> bool {
    match RequireJWT::extract_user_claims(request) {
        Some(user) => user.is_admin() || (user.has_role(ROLE_TUTOR) && course.is_owned_by(user.id)),
        None => false,
    }
}

/// 当前用户能否查看该课程：已发布的课程对所有人可见
pub(crate) fn can_view(course: &Course, request: &HttpRequest) -> bool {
    course.status == CourseStatus::Published || can_manage(course, request)
}

/// 加载课程，不存在或已删除时返回 404
pub(crate) async fn load_course(
    storage: &Arc<dyn Storage>,
    course_id: i64,
    request: &HttpRequest,
) -> Result<Course, HttpResponse> {
    match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => Ok(course),
        Ok(None) => Err(not_found(request, ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Err(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to get course: {e}"),
        )),
    }
}

/// 加载课程并检查管理权限
pub(crate) async fn load_managed_course(
    storage: &Arc<dyn Storage>,
    course_id: i64,
    request: &HttpRequest,
) -> Result<Course, HttpResponse> {
    if RequireJWT::extract_user_id(request).is_none() {
        return Err(unauthorized(request));
    }
    let course = load_course(storage, course_id, request).await?;
    if !can_manage(&course, request) {
        return Err(forbidden(request));
    }
    Ok(course)
}

/// 加载章节及其所属课程
pub(crate) async fn load_module(
    storage: &Arc<dyn Storage>,
    module_id: i64,
    request: &HttpRequest,
) -> Result<(CourseModule, Course), HttpResponse> {
    let module = match storage.get_module_by_id(module_id).await {
        Ok(Some(module)) => module,
        Ok(None) => {
            return Err(not_found(
                request,
                ErrorCode::CourseModuleNotFound,
                "Module not found",
            ));
        }
        Err(e) => {
            return Err(internal_error(
                request,
                ErrorCode::InternalServerError,
                format!("Failed to get module: {e}"),
            ));
        }
    };
    // 课程被软删除后，其章节同样不可见
    let course = match load_course(storage, module.course_id, request).await {
        Ok(course) => course,
        Err(_) => {
            return Err(not_found(
                request,
                ErrorCode::CourseModuleNotFound,
                "Module not found",
            ));
        }
    };
    Ok((module, course))
}

/// 检查分类是否存在
pub(crate) async fn ensure_category(
    storage: &Arc<dyn Storage>,
    category_id: Option<i64>,
    request: &HttpRequest,
) -> Result<(), HttpResponse> {
    let Some(category_id) = category_id else {
        return Ok(());
    };
    match storage.get_category_by_id(category_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(not_found(
            request,
            ErrorCode::CategoryNotFound,
            "Category not found",
        )),
        Err(e) => Err(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to get category: {e}"),
        )),
    }
}

/// 检查指定的导师存在且持有 tutor 角色
pub(crate) async fn ensure_tutor(
    storage: &Arc<dyn Storage>,
    tutor_id: Option<i64>,
    request: &HttpRequest,
) -> Result<(), HttpResponse> {
    let Some(tutor_id) = tutor_id else {
        return Ok(());
    };
    match storage.get_user_by_id(tutor_id).await {
        Ok(Some(user)) if user.has_role(ROLE_TUTOR) => Ok(()),
        Ok(_) => Err(not_found(request, ErrorCode::UserNotFound, "Tutor not found")),
        Err(e) => Err(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to get tutor: {e}"),
        )),
    }
}
