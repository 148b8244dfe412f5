//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

use chrono::{DateTime, Utc};

pub mod prelude;

pub mod addresses;
pub mod categories;
pub mod cities;
pub mod countries;
pub mod course_modules;
pub mod courses;
pub mod enrollments;
pub mod file_uploads;
pub mod lessons;
pub mod permissions;
pub mod role_permissions;
pub mod roles;
pub mod states;
pub mod user_roles;
pub mod users;

/// 秒级时间戳转 UTC 时间
pub(crate) fn to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
