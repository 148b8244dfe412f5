use serde::Deserialize;
use validator::Validate;

use super::entities::CourseStatus;
use crate::models::common::PaginationQuery;
use crate::models::common::pagination::deserialize_optional_string_to_i64;
use crate::utils::validate::ValidateRequest;

// 创建分类请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Category name must be 1-100 characters"))]
    pub name: String,
    pub description: Option<String>,
}

impl ValidateRequest for CreateCategoryRequest {
    const FIELD_ORDER: &'static [&'static str] = &["name"];
}

// 更新分类请求
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Category name must be 1-100 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ValidateRequest for UpdateCategoryRequest {
    const FIELD_ORDER: &'static [&'static str] = &["name"];
}

// 课程列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct CourseListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<CourseStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_string_to_i64")]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string_to_i64")]
    pub tutor_id: Option<i64>,
    pub search: Option<String>,
}

// 课程列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct CourseListQuery {
    pub page: i64,
    pub page_size: i64,
    pub status: Option<CourseStatus>,
    pub category_id: Option<i64>,
    pub tutor_id: Option<i64>,
    pub search: Option<String>,
}

impl From<CourseListParams> for CourseListQuery {
    fn from(params: CourseListParams) -> Self {
        Self {
            page: params.pagination.page(),
            page_size: params.pagination.page_size(),
            status: params.status,
            category_id: params.category_id,
            tutor_id: params.tutor_id,
            search: params.search,
        }
    }
}

// 创建课程请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 200, message = "Course title must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    /// 管理员可指定导师；导师创建时固定为自己
    pub tutor_id: Option<i64>,
    pub status: Option<CourseStatus>,
}

impl ValidateRequest for CreateCourseRequest {
    const FIELD_ORDER: &'static [&'static str] = &["title"];
}

// 更新课程请求
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 200, message = "Course title must be 1-200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub tutor_id: Option<i64>,
    pub status: Option<CourseStatus>,
}

impl ValidateRequest for UpdateCourseRequest {
    const FIELD_ORDER: &'static [&'static str] = &["title"];
}

// 创建章节请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateModuleRequest {
    #[validate(length(min = 1, max = 200, message = "Module title must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Position must not be negative"))]
    pub position: Option<i32>,
}

impl ValidateRequest for CreateModuleRequest {
    const FIELD_ORDER: &'static [&'static str] = &["title", "position"];
}

// 更新章节请求
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateModuleRequest {
    #[validate(length(min = 1, max = 200, message = "Module title must be 1-200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Position must not be negative"))]
    pub position: Option<i32>,
}

impl ValidateRequest for UpdateModuleRequest {
    const FIELD_ORDER: &'static [&'static str] = &["title", "position"];
}

// 创建课时请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLessonRequest {
    #[validate(length(min = 1, max = 200, message = "Lesson title must be 1-200 characters"))]
    pub title: String,
    pub content: Option<String>,
    #[validate(range(min = 0, message = "Position must not be negative"))]
    pub position: Option<i32>,
    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes"))]
    pub duration_minutes: Option<i32>,
}

impl ValidateRequest for CreateLessonRequest {
    const FIELD_ORDER: &'static [&'static str] = &["title", "position", "duration_minutes"];
}

// 更新课时请求
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLessonRequest {
    #[validate(length(min = 1, max = 200, message = "Lesson title must be 1-200 characters"))]
    pub title: Option<String>,
    pub content: Option<String>,
    #[validate(range(min = 0, message = "Position must not be negative"))]
    pub position: Option<i32>,
    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes"))]
    pub duration_minutes: Option<i32>,
}

impl ValidateRequest for UpdateLessonRequest {
    const FIELD_ORDER: &'static [&'static str] = &["title", "position", "duration_minutes"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_list_params_from_query() {
        let params = actix_web::web::Query::<CourseListParams>::from_query(
            "status=published&category_id=3&size=20",
        )
        .expect("query should parse")
        .into_inner();
        let query = CourseListQuery::from(params);
        assert_eq!(query.status, Some(CourseStatus::Published));
        assert_eq!(query.category_id, Some(3));
        assert_eq!(query.tutor_id, None);
        assert_eq!(query.page_size, 20);
    }

    #[test]
    fn test_lesson_duration_range() {
        let req = CreateLessonRequest {
            title: "Intro".into(),
            content: None,
            position: Some(0),
            duration_minutes: Some(0),
        };
        assert_eq!(
            req.validate_request().unwrap_err(),
            "Duration must be between 1 and 1440 minutes"
        );
    }
}
