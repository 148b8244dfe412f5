use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::users::entities::User;

// 管理后台统计
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_users: i64,
    pub active_users: i64,
    /// 角色名 -> 用户数
    pub users_by_role: BTreeMap<String, i64>,
    pub total_courses: i64,
    /// 课程状态 -> 数量
    pub courses_by_status: BTreeMap<String, i64>,
    pub total_enrollments: i64,
    /// 选课状态 -> 数量
    pub enrollments_by_status: BTreeMap<String, i64>,
    pub recent_users: Vec<User>,
}

// 测试邮件结果
#[derive(Debug, Serialize)]
pub struct TestEmailResponse {
    pub delivered: bool,
}
