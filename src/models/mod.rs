//! 业务数据模型
//!
//! 每个子模块按 entities / requests / responses 拆分，
//! 与 `entity` 中的数据库模型分离。

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod common;
pub mod courses;
pub mod enrollments;
pub mod files;
pub mod roles;
pub mod users;

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery};

/// 业务错误码
///
/// 与 HTTP 状态码配合使用，序列化为响应信封中的数字 `code`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    ValidationFailed = 1001,
    Unauthorized = 1002,
    Forbidden = 1003,
    NotFound = 1004,
    RateLimitExceeded = 1005,
    InternalServerError = 1006,
    AuthFailed = 1007,
    RegisterFailed = 1008,

    // 用户
    UserNotFound = 2000,
    UserAlreadyExists = 2001,
    UserCreationFailed = 2002,
    UserUpdateFailed = 2003,
    UserDeleteFailed = 2004,
    CanNotDeleteCurrentUser = 2005,
    UserInactive = 2006,

    // 角色与权限
    RoleNotFound = 3000,
    RoleAlreadyExists = 3001,
    SystemRoleProtected = 3002,
    RoleInUse = 3003,
    PermissionNotFound = 3004,
    PermissionAlreadyExists = 3005,
    PermissionNotAssigned = 3006,

    // 课程
    CategoryNotFound = 4000,
    CategoryAlreadyExists = 4001,
    CourseNotFound = 4002,
    CourseModuleNotFound = 4003,
    LessonNotFound = 4004,
    CourseNotPublished = 4005,

    // 选课
    EnrollmentNotFound = 5000,
    EnrollmentAlreadyExists = 5001,

    // 地址
    CountryNotFound = 6000,
    StateNotFound = 6001,
    CityNotFound = 6002,
    AddressNotFound = 6003,
    GeoAlreadyExists = 6004,

    // 文件
    FileNotFound = 7000,
    FileUploadFailed = 7001,
    FileTypeNotAllowed = 7002,
    FileSizeExceeded = 7003,
    MultifileUploadNotAllowed = 7004,
    FileTargetNotFound = 7005,

    // 邮件
    MailDeliveryFailed = 8000,
}
