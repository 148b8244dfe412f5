use serde::{Deserialize, Serialize};

use crate::models::roles::entities::ADMIN_ROLES;
use crate::string_enum;

string_enum! {
    // 用户状态
    pub enum UserStatus("user status") {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub status: UserStatus,
    /// 角色名称
    #[serde(default)]
    pub roles: Vec<String>,
    /// 通过角色获得的权限代码（去重）
    #[serde(default)]
    pub permissions: Vec<String>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    /// 是否持有管理员角色
    pub fn is_admin(&self) -> bool {
        self.has_any_role(ADMIN_ROLES)
    }

    pub fn has_permission(&self, code: &str) -> bool {
        self.permissions.iter().any(|p| p == code)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// 显示名称，没有姓名时回退到用户名
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }

    // 生成 token 对（access + refresh）
    pub fn generate_token_pair(&self) -> Result<crate::utils::jwt::TokenPair, String> {
        crate::utils::jwt::JwtUtils::generate_token_pair(self.id, &self.roles)
            .map_err(|e| format!("生成 token 对失败: {e}"))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// 测试用户
    pub fn user_with_roles(id: i64, roles: &[&str]) -> User {
        let now = chrono::Utc::now();
        User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            password_hash: String::new(),
            first_name: None,
            last_name: None,
            phone: None,
            status: UserStatus::Active,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            permissions: Vec::new(),
            last_login: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::user_with_roles;
    use super::*;

    #[test]
    fn test_admin_detection() {
        assert!(user_with_roles(1, &["admin"]).is_admin());
        assert!(user_with_roles(1, &["student", "super_admin"]).is_admin());
        assert!(!user_with_roles(1, &["tutor"]).is_admin());
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut user = user_with_roles(7, &[]);
        assert_eq!(user.display_name(), "user7");

        user.first_name = Some("Ada".into());
        user.last_name = Some("Lovelace".into());
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let mut user = user_with_roles(1, &["student"]);
        user.password_hash = "secret".into();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["status"], "active");
    }
}
