pub mod addresses;

pub mod admin;

pub mod auth;

pub mod courses;

pub mod enrollments;

pub mod files;

pub mod roles;

pub mod users;

pub use addresses::configure_address_routes;
pub use admin::configure_admin_routes;
pub use auth::configure_auth_routes;
pub use courses::configure_course_routes;
pub use enrollments::configure_enrollment_routes;
pub use files::configure_file_routes;
pub use roles::configure_role_routes;
pub use users::configure_user_routes;

use actix_web::web;

/// 注册全部业务路由
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_user_routes)
        .configure(configure_role_routes)
        .configure(configure_course_routes)
        .configure(configure_enrollment_routes)
        .configure(configure_address_routes)
        .configure(configure_file_routes)
        .configure(configure_admin_routes);
}
