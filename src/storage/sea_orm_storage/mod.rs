//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod addresses;
mod courses;
mod dashboard;
mod enrollments;
mod files;
mod permissions;
mod roles;
pub(crate) mod users;

use crate::config::AppConfig;
use crate::errors::{Result, TutorHubError};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        Self::run_migrations(&db).await?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 内存 SQLite，单连接保证所有查询落在同一个库上
    #[cfg(test)]
    pub(crate) async fn new_in_memory() -> Result<Self> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| TutorHubError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opt)
            .await
            .map_err(|e| TutorHubError::database_connection(format!("SQLite 连接失败: {e}")))?;

        let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
        Self::run_migrations(&db).await?;

        Ok(Self { db })
    }

    async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
        Migrator::up(db, None)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("数据库迁移失败: {e}")))
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| TutorHubError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| TutorHubError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| TutorHubError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(TutorHubError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    PaginatedResponse,
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn is_username_taken(&self, username: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.is_username_taken_impl(username, exclude_id).await
    }

    async fn is_email_taken(&self, email: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.is_email_taken_impl(email, exclude_id).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn list_user_roles(&self, user_id: i64) -> Result<Vec<Role>> {
        self.list_user_roles_impl(user_id).await
    }

    async fn assign_role_to_user(&self, user_id: i64, role_id: i64) -> Result<bool> {
        self.assign_role_to_user_impl(user_id, role_id).await
    }

    async fn revoke_role_from_user(&self, user_id: i64, role_id: i64) -> Result<bool> {
        self.revoke_role_from_user_impl(user_id, role_id).await
    }

    // 角色模块
    async fn create_role(&self, role: CreateRoleRequest) -> Result<Role> {
        self.create_role_impl(role).await
    }

    async fn get_role_by_id(&self, id: i64) -> Result<Option<Role>> {
        self.get_role_by_id_impl(id).await
    }

    async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.get_role_by_name_impl(name).await
    }

    async fn list_roles_with_pagination(
        &self,
        page: i64,
        page_size: i64,
        search: Option<String>,
    ) -> Result<RoleListResponse> {
        self.list_roles_with_pagination_impl(page, page_size, search)
            .await
    }

    async fn update_role(&self, id: i64, update: UpdateRoleRequest) -> Result<Option<Role>> {
        self.update_role_impl(id, update).await
    }

    async fn delete_role(&self, id: i64) -> Result<RoleDeletion> {
        self.delete_role_impl(id).await
    }

    async fn list_role_permissions(&self, role_id: i64) -> Result<Vec<Permission>> {
        self.list_role_permissions_impl(role_id).await
    }

    async fn assign_permissions_to_role(
        &self,
        role_id: i64,
        permission_ids: &[i64],
    ) -> Result<u64> {
        self.assign_permissions_to_role_impl(role_id, permission_ids)
            .await
    }

    async fn revoke_permission_from_role(&self, role_id: i64, permission_id: i64) -> Result<bool> {
        self.revoke_permission_from_role_impl(role_id, permission_id)
            .await
    }

    // 权限模块
    async fn create_permission(&self, permission: CreatePermissionRequest) -> Result<Permission> {
        self.create_permission_impl(permission).await
    }

    async fn get_permission_by_id(&self, id: i64) -> Result<Option<Permission>> {
        self.get_permission_by_id_impl(id).await
    }

    async fn get_permission_by_code(&self, code: &str) -> Result<Option<Permission>> {
        self.get_permission_by_code_impl(code).await
    }

    async fn get_permissions_by_ids(&self, ids: &[i64]) -> Result<Vec<Permission>> {
        self.get_permissions_by_ids_impl(ids).await
    }

    async fn list_permissions_with_pagination(
        &self,
        page: i64,
        page_size: i64,
        search: Option<String>,
    ) -> Result<PermissionListResponse> {
        self.list_permissions_with_pagination_impl(page, page_size, search)
            .await
    }

    async fn delete_permission(&self, id: i64) -> Result<bool> {
        self.delete_permission_impl(id).await
    }

    // 课程模块
    async fn create_category(&self, category: CreateCategoryRequest) -> Result<Category> {
        self.create_category_impl(category).await
    }

    async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        self.get_category_by_id_impl(id).await
    }

    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        self.get_category_by_name_impl(name).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.list_categories_impl().await
    }

    async fn update_category(
        &self,
        id: i64,
        update: UpdateCategoryRequest,
    ) -> Result<Option<Category>> {
        self.update_category_impl(id, update).await
    }

    async fn delete_category(&self, id: i64) -> Result<bool> {
        self.delete_category_impl(id).await
    }

    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn get_course_detail(&self, id: i64) -> Result<Option<CourseDetailResponse>> {
        self.get_course_detail_impl(id).await
    }

    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        self.list_courses_with_pagination_impl(query).await
    }

    async fn update_course(&self, id: i64, update: UpdateCourseRequest) -> Result<Option<Course>> {
        self.update_course_impl(id, update).await
    }

    async fn delete_course(&self, id: i64) -> Result<bool> {
        self.delete_course_impl(id).await
    }

    async fn create_module(
        &self,
        course_id: i64,
        module: CreateModuleRequest,
    ) -> Result<CourseModule> {
        self.create_module_impl(course_id, module).await
    }

    async fn get_module_by_id(&self, id: i64) -> Result<Option<CourseModule>> {
        self.get_module_by_id_impl(id).await
    }

    async fn list_modules(&self, course_id: i64) -> Result<Vec<CourseModule>> {
        self.list_modules_impl(course_id).await
    }

    async fn update_module(
        &self,
        id: i64,
        update: UpdateModuleRequest,
    ) -> Result<Option<CourseModule>> {
        self.update_module_impl(id, update).await
    }

    async fn delete_module(&self, id: i64) -> Result<bool> {
        self.delete_module_impl(id).await
    }

    async fn create_lesson(&self, module_id: i64, lesson: CreateLessonRequest) -> Result<Lesson> {
        self.create_lesson_impl(module_id, lesson).await
    }

    async fn get_lesson_by_id(&self, id: i64) -> Result<Option<Lesson>> {
        self.get_lesson_by_id_impl(id).await
    }

    async fn list_lessons(&self, module_id: i64) -> Result<Vec<Lesson>> {
        self.list_lessons_impl(module_id).await
    }

    async fn update_lesson(&self, id: i64, update: UpdateLessonRequest) -> Result<Option<Lesson>> {
        self.update_lesson_impl(id, update).await
    }

    async fn delete_lesson(&self, id: i64) -> Result<bool> {
        self.delete_lesson_impl(id).await
    }

    // 选课模块
    async fn create_enrollment(
        &self,
        student_id: i64,
        course_id: i64,
        status: EnrollmentStatus,
    ) -> Result<Enrollment> {
        self.create_enrollment_impl(student_id, course_id, status)
            .await
    }

    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>> {
        self.get_enrollment_by_id_impl(id).await
    }

    async fn get_enrollment_by_student_and_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>> {
        self.get_enrollment_by_student_and_course_impl(student_id, course_id)
            .await
    }

    async fn list_enrollments_with_pagination(
        &self,
        query: EnrollmentListQuery,
    ) -> Result<EnrollmentListResponse> {
        self.list_enrollments_with_pagination_impl(query).await
    }

    async fn update_enrollment(
        &self,
        id: i64,
        update: UpdateEnrollmentRequest,
    ) -> Result<Option<Enrollment>> {
        self.update_enrollment_impl(id, update).await
    }

    async fn delete_enrollment(&self, id: i64) -> Result<bool> {
        self.delete_enrollment_impl(id).await
    }

    // 地理与地址模块
    async fn create_country(&self, country: CreateCountryRequest) -> Result<Country> {
        self.create_country_impl(country).await
    }

    async fn get_country_by_id(&self, id: i64) -> Result<Option<Country>> {
        self.get_country_by_id_impl(id).await
    }

    async fn country_exists(&self, name: &str, iso_code: &str) -> Result<bool> {
        self.country_exists_impl(name, iso_code).await
    }

    async fn list_countries(&self) -> Result<Vec<Country>> {
        self.list_countries_impl().await
    }

    async fn create_state(&self, country_id: i64, state: CreateStateRequest) -> Result<State> {
        self.create_state_impl(country_id, state).await
    }

    async fn get_state_by_id(&self, id: i64) -> Result<Option<State>> {
        self.get_state_by_id_impl(id).await
    }

    async fn state_exists(&self, country_id: i64, name: &str) -> Result<bool> {
        self.state_exists_impl(country_id, name).await
    }

    async fn list_states(&self, country_id: i64) -> Result<Vec<State>> {
        self.list_states_impl(country_id).await
    }

    async fn create_city(&self, state_id: i64, city: CreateCityRequest) -> Result<City> {
        self.create_city_impl(state_id, city).await
    }

    async fn get_city_by_id(&self, id: i64) -> Result<Option<City>> {
        self.get_city_by_id_impl(id).await
    }

    async fn city_exists(&self, state_id: i64, name: &str) -> Result<bool> {
        self.city_exists_impl(state_id, name).await
    }

    async fn list_cities(&self, state_id: i64) -> Result<Vec<City>> {
        self.list_cities_impl(state_id).await
    }

    async fn create_address(&self, user_id: i64, address: CreateAddressRequest) -> Result<Address> {
        self.create_address_impl(user_id, address).await
    }

    async fn get_address_by_id(&self, id: i64) -> Result<Option<AddressDetail>> {
        self.get_address_by_id_impl(id).await
    }

    async fn list_user_addresses(&self, user_id: i64) -> Result<Vec<AddressDetail>> {
        self.list_user_addresses_impl(user_id).await
    }

    async fn update_address(
        &self,
        id: i64,
        update: UpdateAddressRequest,
    ) -> Result<Option<AddressDetail>> {
        self.update_address_impl(id, update).await
    }

    async fn delete_address(&self, id: i64) -> Result<bool> {
        self.delete_address_impl(id).await
    }

    // 文件模块
    async fn create_file_upload(&self, file: NewFileUpload) -> Result<FileUpload> {
        self.create_file_upload_impl(file).await
    }

    async fn get_file_upload_by_id(&self, id: i64) -> Result<Option<FileUpload>> {
        self.get_file_upload_by_id_impl(id).await
    }

    async fn list_file_uploads_with_pagination(
        &self,
        query: FileListQuery,
    ) -> Result<PaginatedResponse<FileUpload>> {
        self.list_file_uploads_with_pagination_impl(query).await
    }

    async fn list_user_avatars(&self, user_id: i64) -> Result<Vec<FileUpload>> {
        self.list_user_avatars_impl(user_id).await
    }

    async fn delete_file_upload(&self, id: i64) -> Result<bool> {
        self.delete_file_upload_impl(id).await
    }

    // 管理后台
    async fn get_dashboard_stats(&self) -> Result<DashboardStats> {
        self.get_dashboard_stats_impl().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("tutorhub.db").unwrap(),
            "sqlite://tutorhub.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/db").unwrap(),
            "postgres://u:p@localhost/db"
        );
        assert!(SeaOrmStorage::build_database_url("ftp://nope").is_err());
    }

    #[tokio::test]
    async fn test_migrations_seed_system_roles() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        for name in crate::models::roles::entities::SYSTEM_ROLES {
            let role = storage.get_role_by_name(name).await.unwrap();
            assert!(role.is_some_and(|r| r.is_system), "missing role {name}");
        }
        assert_eq!(storage.count_users().await.unwrap(), 0);
    }
}
