use serde::Deserialize;
use validator::Validate;

use super::entities::EnrollmentStatus;
use crate::models::common::PaginationQuery;
use crate::models::common::pagination::deserialize_optional_string_to_i64;
use crate::utils::validate::ValidateRequest;

// 选课列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct EnrollmentListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_string_to_i64")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string_to_i64")]
    pub student_id: Option<i64>,
    pub status: Option<EnrollmentStatus>,
}

/// 选课可见范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnrollmentScope {
    /// 全部（管理员）
    #[default]
    All,
    /// 某导师名下课程的选课
    Tutor(i64),
    /// 某学生自己的选课
    Student(i64),
}

// 选课列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct EnrollmentListQuery {
    pub page: i64,
    pub page_size: i64,
    pub scope: EnrollmentScope,
    pub course_id: Option<i64>,
    pub student_id: Option<i64>,
    pub status: Option<EnrollmentStatus>,
}

// 选课请求
#[derive(Debug, Deserialize)]
pub struct CreateEnrollmentRequest {
    pub course_id: i64,
    /// 仅管理员可以为其他学生选课
    pub student_id: Option<i64>,
}

// 更新选课请求
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEnrollmentRequest {
    pub status: Option<EnrollmentStatus>,
    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    pub progress: Option<i32>,
}

impl ValidateRequest for UpdateEnrollmentRequest {
    const FIELD_ORDER: &'static [&'static str] = &["status", "progress"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_out_of_range() {
        let req = UpdateEnrollmentRequest {
            status: None,
            progress: Some(101),
        };
        assert_eq!(
            req.validate_request().unwrap_err(),
            "Progress must be between 0 and 100"
        );
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result = serde_json::from_str::<UpdateEnrollmentRequest>(r#"{"status":"paused"}"#);
        assert!(result.is_err());
    }
}
