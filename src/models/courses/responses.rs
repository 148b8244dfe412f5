use serde::Serialize;

use super::entities::{Course, CourseModule, Lesson};
use crate::models::common::PaginatedResponse;

pub type CourseListResponse = PaginatedResponse<Course>;

// 章节及其课时
#[derive(Debug, Clone, Serialize)]
pub struct ModuleWithLessons {
    #[serde(flatten)]
    pub module: CourseModule,
    pub lessons: Vec<Lesson>,
}

// 课程详情
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<ModuleWithLessons>,
}
