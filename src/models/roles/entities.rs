use serde::{Deserialize, Serialize};

/// 管理员角色
pub const ADMIN_ROLES: &[&str] = &["super_admin", "admin"];

/// 系统内置角色，不可重命名或删除
pub const SYSTEM_ROLES: &[&str] = &["super_admin", "admin", "tutor", "student", "parent"];

/// 可以创建课程的角色
pub const STAFF_ROLES: &[&str] = &["super_admin", "admin", "tutor"];

pub const ROLE_TUTOR: &str = "tutor";
pub const ROLE_STUDENT: &str = "student";
pub const ROLE_PARENT: &str = "parent";

/// 权限不足时的固定提示
pub const PERMISSION_DENIED_MESSAGE: &str = "You do not have permission to perform this action";
/// 修改或删除系统角色时的固定提示
pub const SYSTEM_ROLE_PROTECTED_MESSAGE: &str = "System roles cannot be renamed or deleted";
/// 删除仍被用户引用的角色时的固定提示
pub const ROLE_IN_USE_MESSAGE: &str = "Role is still assigned to users and cannot be deleted";

pub fn is_system_role(name: &str) -> bool {
    SYSTEM_ROLES.contains(&name)
}

// 角色
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_system: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 权限，代码格式为 resource.action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: i64,
    pub code: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 删除角色的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleDeletion {
    Deleted,
    NotFound,
    /// 仍被未删除的用户持有
    InUse(u64),
}

// 角色及其权限
#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_roles() {
        for role in ADMIN_ROLES {
            assert!(is_system_role(role));
        }
        assert!(is_system_role(ROLE_PARENT));
        assert!(!is_system_role("librarian"));
    }
}
