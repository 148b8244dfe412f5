use serde::{Deserialize, Serialize};

use crate::string_enum;

string_enum! {
    // 课程状态
    pub enum CourseStatus("course status") {
        Draft => "draft",
        Published => "published",
        Archived => "archived",
    }
}

// 课程分类
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 课程
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub tutor_id: Option<i64>,
    pub status: CourseStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Course {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.tutor_id == Some(user_id)
    }
}

// 课程章节
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseModule {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 课时
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub module_id: i64,
    pub title: String,
    pub content: Option<String>,
    pub position: i32,
    pub duration_minutes: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
