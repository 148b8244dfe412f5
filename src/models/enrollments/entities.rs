use serde::{Deserialize, Serialize};

use crate::string_enum;

string_enum! {
    // 选课状态
    pub enum EnrollmentStatus("enrollment status") {
        Pending => "pending",
        Active => "active",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

// 选课记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub status: EnrollmentStatus,
    /// 学习进度（0-100）
    pub progress: i32,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
