use std::sync::Arc;

use crate::models::{
    addresses::{
        entities::{Address, AddressDetail, City, Country, State},
        requests::{
            CreateAddressRequest, CreateCityRequest, CreateCountryRequest, CreateStateRequest,
            UpdateAddressRequest,
        },
    },
    admin::responses::DashboardStats,
    courses::{
        entities::{Category, Course, CourseModule, Lesson},
        requests::{
            CourseListQuery, CreateCategoryRequest, CreateCourseRequest, CreateLessonRequest,
            CreateModuleRequest, UpdateCategoryRequest, UpdateCourseRequest, UpdateLessonRequest,
            UpdateModuleRequest,
        },
        responses::{CourseDetailResponse, CourseListResponse},
    },
    enrollments::{
        entities::{Enrollment, EnrollmentStatus},
        requests::{EnrollmentListQuery, UpdateEnrollmentRequest},
        responses::EnrollmentListResponse,
    },
    files::{
        entities::{FileUpload, NewFileUpload},
        requests::FileListQuery,
    },
    roles::{
        entities::{Permission, Role, RoleDeletion},
        requests::{CreatePermissionRequest, CreateRoleRequest, UpdateRoleRequest},
        responses::{PermissionListResponse, RoleListResponse},
    },
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法（软删除的用户对查询不可见）
    // 创建用户，`password` 须为已哈希的值；角色在同一事务中写入
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息（含角色和权限）
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 用户名是否已被占用（包括软删除的用户）
    async fn is_username_taken(&self, username: &str, exclude_id: Option<i64>) -> Result<bool>;
    // 邮箱是否已被占用（包括软删除的用户）
    async fn is_email_taken(&self, email: &str, exclude_id: Option<i64>) -> Result<bool>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 软删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;
    // 列出用户的角色
    async fn list_user_roles(&self, user_id: i64) -> Result<Vec<Role>>;
    // 为用户分配角色，已分配时返回 false
    async fn assign_role_to_user(&self, user_id: i64, role_id: i64) -> Result<bool>;
    // 撤销用户角色
    async fn revoke_role_from_user(&self, user_id: i64, role_id: i64) -> Result<bool>;

    /// 角色管理方法
    async fn create_role(&self, role: CreateRoleRequest) -> Result<Role>;
    async fn get_role_by_id(&self, id: i64) -> Result<Option<Role>>;
    async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>>;
    async fn list_roles_with_pagination(
        &self,
        page: i64,
        page_size: i64,
        search: Option<String>,
    ) -> Result<RoleListResponse>;
    async fn update_role(&self, id: i64, update: UpdateRoleRequest) -> Result<Option<Role>>;
    // 没有未删除的用户持有时，删除角色及其关联记录
    async fn delete_role(&self, id: i64) -> Result<RoleDeletion>;
    async fn list_role_permissions(&self, role_id: i64) -> Result<Vec<Permission>>;
    // 为角色授权，返回新增的授权数量
    async fn assign_permissions_to_role(&self, role_id: i64, permission_ids: &[i64])
    -> Result<u64>;
    async fn revoke_permission_from_role(&self, role_id: i64, permission_id: i64) -> Result<bool>;

    /// 权限管理方法
    async fn create_permission(&self, permission: CreatePermissionRequest) -> Result<Permission>;
    async fn get_permission_by_id(&self, id: i64) -> Result<Option<Permission>>;
    async fn get_permission_by_code(&self, code: &str) -> Result<Option<Permission>>;
    async fn get_permissions_by_ids(&self, ids: &[i64]) -> Result<Vec<Permission>>;
    async fn list_permissions_with_pagination(
        &self,
        page: i64,
        page_size: i64,
        search: Option<String>,
    ) -> Result<PermissionListResponse>;
    // 删除权限及其授权记录
    async fn delete_permission(&self, id: i64) -> Result<bool>;

    /// 课程分类
    async fn create_category(&self, category: CreateCategoryRequest) -> Result<Category>;
    async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>>;
    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn update_category(
        &self,
        id: i64,
        update: UpdateCategoryRequest,
    ) -> Result<Option<Category>>;
    async fn delete_category(&self, id: i64) -> Result<bool>;

    /// 课程管理方法（软删除的课程对查询不可见）
    // `tutor_id` 须由服务层确定
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    // 课程详情，章节和课时按 position 排序
    async fn get_course_detail(&self, id: i64) -> Result<Option<CourseDetailResponse>>;
    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse>;
    async fn update_course(&self, id: i64, update: UpdateCourseRequest) -> Result<Option<Course>>;
    async fn delete_course(&self, id: i64) -> Result<bool>;

    /// 章节与课时
    async fn create_module(
        &self,
        course_id: i64,
        module: CreateModuleRequest,
    ) -> Result<CourseModule>;
    async fn get_module_by_id(&self, id: i64) -> Result<Option<CourseModule>>;
    async fn list_modules(&self, course_id: i64) -> Result<Vec<CourseModule>>;
    async fn update_module(
        &self,
        id: i64,
        update: UpdateModuleRequest,
    ) -> Result<Option<CourseModule>>;
    // 删除章节及其课时
    async fn delete_module(&self, id: i64) -> Result<bool>;
    async fn create_lesson(&self, module_id: i64, lesson: CreateLessonRequest) -> Result<Lesson>;
    async fn get_lesson_by_id(&self, id: i64) -> Result<Option<Lesson>>;
    async fn list_lessons(&self, module_id: i64) -> Result<Vec<Lesson>>;
    async fn update_lesson(&self, id: i64, update: UpdateLessonRequest) -> Result<Option<Lesson>>;
    async fn delete_lesson(&self, id: i64) -> Result<bool>;

    /// 选课管理方法
    async fn create_enrollment(
        &self,
        student_id: i64,
        course_id: i64,
        status: EnrollmentStatus,
    ) -> Result<Enrollment>;
    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>>;
    async fn get_enrollment_by_student_and_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>>;
    async fn list_enrollments_with_pagination(
        &self,
        query: EnrollmentListQuery,
    ) -> Result<EnrollmentListResponse>;
    async fn update_enrollment(
        &self,
        id: i64,
        update: UpdateEnrollmentRequest,
    ) -> Result<Option<Enrollment>>;
    async fn delete_enrollment(&self, id: i64) -> Result<bool>;

    /// 地理层级
    async fn create_country(&self, country: CreateCountryRequest) -> Result<Country>;
    async fn get_country_by_id(&self, id: i64) -> Result<Option<Country>>;
    // 名称或 ISO 代码是否已存在
    async fn country_exists(&self, name: &str, iso_code: &str) -> Result<bool>;
    async fn list_countries(&self) -> Result<Vec<Country>>;
    async fn create_state(&self, country_id: i64, state: CreateStateRequest) -> Result<State>;
    async fn get_state_by_id(&self, id: i64) -> Result<Option<State>>;
    async fn state_exists(&self, country_id: i64, name: &str) -> Result<bool>;
    async fn list_states(&self, country_id: i64) -> Result<Vec<State>>;
    async fn create_city(&self, state_id: i64, city: CreateCityRequest) -> Result<City>;
    async fn get_city_by_id(&self, id: i64) -> Result<Option<City>>;
    async fn city_exists(&self, state_id: i64, name: &str) -> Result<bool>;
    async fn list_cities(&self, state_id: i64) -> Result<Vec<City>>;

    /// 用户地址（设为默认地址时清除该用户之前的默认地址）
    async fn create_address(&self, user_id: i64, address: CreateAddressRequest) -> Result<Address>;
    async fn get_address_by_id(&self, id: i64) -> Result<Option<AddressDetail>>;
    async fn list_user_addresses(&self, user_id: i64) -> Result<Vec<AddressDetail>>;
    async fn update_address(
        &self,
        id: i64,
        update: UpdateAddressRequest,
    ) -> Result<Option<AddressDetail>>;
    async fn delete_address(&self, id: i64) -> Result<bool>;

    /// 文件管理方法
    async fn create_file_upload(&self, file: NewFileUpload) -> Result<FileUpload>;
    async fn get_file_upload_by_id(&self, id: i64) -> Result<Option<FileUpload>>;
    async fn list_file_uploads_with_pagination(
        &self,
        query: FileListQuery,
    ) -> Result<crate::models::PaginatedResponse<FileUpload>>;
    async fn list_user_avatars(&self, user_id: i64) -> Result<Vec<FileUpload>>;
    async fn delete_file_upload(&self, id: i64) -> Result<bool>;

    /// 管理后台统计
    async fn get_dashboard_stats(&self) -> Result<DashboardStats>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
