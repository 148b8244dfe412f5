pub mod addresses;
pub mod admin;
pub mod auth;
pub mod categories;
pub(crate) mod common;
pub mod courses;
pub mod enrollments;
pub mod files;
pub mod geo;
pub mod permissions;
pub mod roles;
pub mod users;

pub use addresses::AddressService;
pub use admin::AdminService;
pub use auth::AuthService;
pub use categories::CategoryService;
pub use courses::CourseService;
pub use enrollments::EnrollmentService;
pub use files::FileService;
pub use geo::GeoService;
pub use permissions::PermissionService;
pub use roles::RoleService;
pub use users::UserService;
