//! 预导入模块，方便使用

pub use super::addresses::{
    ActiveModel as AddressActiveModel, Entity as Addresses, Model as AddressModel,
};
pub use super::categories::{
    ActiveModel as CategoryActiveModel, Entity as Categories, Model as CategoryModel,
};
pub use super::cities::{ActiveModel as CityActiveModel, Entity as Cities, Model as CityModel};
pub use super::countries::{
    ActiveModel as CountryActiveModel, Entity as Countries, Model as CountryModel,
};
pub use super::course_modules::{
    ActiveModel as CourseModuleActiveModel, Entity as CourseModules, Model as CourseModuleModel,
};
pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::enrollments::{
    ActiveModel as EnrollmentActiveModel, Entity as Enrollments, Model as EnrollmentModel,
};
pub use super::file_uploads::{
    ActiveModel as FileUploadActiveModel, Entity as FileUploads, Model as FileUploadModel,
};
pub use super::lessons::{ActiveModel as LessonActiveModel, Entity as Lessons, Model as LessonModel};
pub use super::permissions::{
    ActiveModel as PermissionActiveModel, Entity as Permissions, Model as PermissionModel,
};
pub use super::role_permissions::{
    ActiveModel as RolePermissionActiveModel, Entity as RolePermissions,
    Model as RolePermissionModel,
};
pub use super::roles::{ActiveModel as RoleActiveModel, Entity as Roles, Model as RoleModel};
pub use super::states::{ActiveModel as StateActiveModel, Entity as States, Model as StateModel};
pub use super::user_roles::{
    ActiveModel as UserRoleActiveModel, Entity as UserRoles, Model as UserRoleModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
