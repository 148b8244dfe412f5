use std::collections::{BTreeSet, HashMap};

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{role_permissions, roles, user_roles};
use crate::entity::users::{ActiveModel, Column};
use crate::errors::{Result, TutorHubError};
use crate::models::{
    roles::entities::{ROLE_STUDENT, Role},
    users::{
        entities::{User, UserStatus},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::utils::like_contains;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set, SqlErr, TransactionTrait,
};

impl SeaOrmStorage {
    /// 为用户模型加载角色和权限
    pub(crate) async fn hydrate_users(&self, models: Vec<UserModel>) -> Result<Vec<User>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let rows = UserRoles::find()
            .filter(user_roles::Column::UserId.is_in(user_ids))
            .find_also_related(Roles)
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询用户角色失败: {e}")))?;

        let mut roles_by_user: HashMap<i64, Vec<RoleModel>> = HashMap::new();
        for (link, role) in rows {
            if let Some(role) = role {
                roles_by_user.entry(link.user_id).or_default().push(role);
            }
        }

        let role_ids: BTreeSet<i64> = roles_by_user.values().flatten().map(|r| r.id).collect();
        let grants = if role_ids.is_empty() {
            Vec::new()
        } else {
            RolePermissions::find()
                .filter(role_permissions::Column::RoleId.is_in(role_ids))
                .find_also_related(Permissions)
                .all(&self.db)
                .await
                .map_err(|e| TutorHubError::database_operation(format!("查询角色权限失败: {e}")))?
        };

        let mut codes_by_role: HashMap<i64, Vec<String>> = HashMap::new();
        for (grant, permission) in grants {
            if let Some(permission) = permission {
                codes_by_role
                    .entry(grant.role_id)
                    .or_default()
                    .push(permission.code);
            }
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let user_roles = roles_by_user.remove(&model.id).unwrap_or_default();
                let permissions: BTreeSet<String> = user_roles
                    .iter()
                    .filter_map(|r| codes_by_role.get(&r.id))
                    .flatten()
                    .cloned()
                    .collect();
                let mut role_names: Vec<String> = user_roles.into_iter().map(|r| r.name).collect();
                role_names.sort();
                model.into_user(role_names, permissions.into_iter().collect())
            })
            .collect())
    }

    async fn hydrate_user(&self, model: Option<UserModel>) -> Result<Option<User>> {
        match model {
            Some(model) => Ok(self.hydrate_users(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_active_user(&self, condition: Condition) -> Result<Option<User>> {
        let model = Users::find()
            .filter(condition)
            .filter(Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询用户失败: {e}")))?;

        self.hydrate_user(model).await
    }

    /// 创建用户，同一事务写入角色
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            password_hash: Set(req.password),
            first_name: Set(req.first_name),
            last_name: Set(req.last_name),
            phone: Set(req.phone),
            status: Set(UserStatus::Active.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let user = model
            .insert(&txn)
            .await
            .map_err(|e| user_write_error(e, "创建用户失败"))?;

        let mut role_ids = match req.role_ids {
            Some(ids) if !ids.is_empty() => ids,
            _ => {
                let student = Roles::find()
                    .filter(roles::Column::Name.eq(ROLE_STUDENT))
                    .one(&txn)
                    .await
                    .map_err(|e| TutorHubError::database_operation(format!("查询角色失败: {e}")))?
                    .ok_or_else(|| TutorHubError::not_found("Default role 'student' is missing"))?;
                vec![student.id]
            }
        };
        role_ids.sort_unstable();
        role_ids.dedup();

        for role_id in role_ids {
            // 未提交的事务在 drop 时回滚
            let exists = Roles::find_by_id(role_id)
                .one(&txn)
                .await
                .map_err(|e| TutorHubError::database_operation(format!("查询角色失败: {e}")))?
                .is_some();
            if !exists {
                return Err(TutorHubError::not_found(format!("Role {role_id} not found")));
            }
            insert_user_role(&txn, user.id, role_id, now).await?;
        }

        txn.commit()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("提交事务失败: {e}")))?;

        self.get_user_by_id_impl(user.id)
            .await?
            .ok_or_else(|| TutorHubError::database_operation("创建用户后无法读取"))
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        self.find_active_user(Condition::all().add(Column::Id.eq(id)))
            .await
    }

    /// 通过用户名获取用户
    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        self.find_active_user(Condition::all().add(Column::Username.eq(username)))
            .await
    }

    /// 通过邮箱获取用户
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        self.find_active_user(Condition::all().add(Column::Email.eq(email)))
            .await
    }

    /// 通过用户名或邮箱获取用户
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        self.find_active_user(
            Condition::any()
                .add(Column::Username.eq(identifier))
                .add(Column::Email.eq(identifier)),
        )
        .await
    }

    async fn is_taken(&self, condition: Condition, exclude_id: Option<i64>) -> Result<bool> {
        let mut select = Users::find().filter(condition);
        if let Some(id) = exclude_id {
            select = select.filter(Column::Id.ne(id));
        }

        let count = select
            .count(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(count > 0)
    }

    pub async fn is_username_taken_impl(
        &self,
        username: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        self.is_taken(Condition::all().add(Column::Username.eq(username)), exclude_id)
            .await
    }

    pub async fn is_email_taken_impl(&self, email: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.is_taken(Condition::all().add(Column::Email.eq(email)), exclude_id)
            .await
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let page = query.page.max(1) as u64;
        let size = query.page_size.clamp(1, 100) as u64;

        let mut select = Users::find().filter(Column::DeletedAt.is_null());

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let search = search.trim();
            select = select.filter(
                Condition::any()
                    .add(Column::Username.like(like_contains(search)))
                    .add(Column::Email.like(like_contains(search)))
                    .add(Column::FirstName.like(like_contains(search)))
                    .add(Column::LastName.like(like_contains(search))),
            );
        }

        // 角色筛选
        if let Some(ref role) = query.role {
            let holders = UserRoles::find()
                .select_only()
                .column(user_roles::Column::UserId)
                .inner_join(Roles)
                .filter(roles::Column::Name.eq(role.as_str()))
                .into_query();
            select = select.filter(Column::Id.in_subquery(holders));
        }

        // 状态筛选
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询用户总数失败: {e}")))?;

        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询用户列表失败: {e}")))?;

        let users = self.hydrate_users(models).await?;

        Ok(UserListResponse::new(
            users,
            page as i64,
            size as i64,
            total as i64,
        ))
    }

    /// 更新用户信息，`password` 须为已哈希的值
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        // 先检查用户是否存在
        if self.get_user_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(username) = update.username {
            model.username = Set(username);
        }

        if let Some(email) = update.email {
            model.email = Set(email);
        }

        if let Some(password) = update.password {
            model.password_hash = Set(password);
        }

        if let Some(first_name) = update.first_name {
            model.first_name = Set(Some(first_name));
        }

        if let Some(last_name) = update.last_name {
            model.last_name = Set(Some(last_name));
        }

        if let Some(phone) = update.phone {
            model.phone = Set(Some(phone));
        }

        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| user_write_error(e, "更新用户失败"))?;

        self.get_user_by_id_impl(id).await
    }

    /// 软删除用户
    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::DeletedAt, sea_orm::sea_query::Expr::value(now))
            .col_expr(Column::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .filter(Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("删除用户失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 更新用户最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                TutorHubError::database_operation(format!("更新最后登录时间失败: {e}"))
            })?;

        Ok(result.rows_affected > 0)
    }

    /// 统计用户数量
    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find()
            .count(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("统计用户数量失败: {e}")))?;

        Ok(count)
    }

    /// 列出用户的角色
    pub async fn list_user_roles_impl(&self, user_id: i64) -> Result<Vec<Role>> {
        let rows = Roles::find()
            .inner_join(UserRoles)
            .filter(user_roles::Column::UserId.eq(user_id))
            .order_by_asc(roles::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询用户角色失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_role()).collect())
    }

    /// 为用户分配角色，已存在时不重复插入
    pub async fn assign_role_to_user_impl(&self, user_id: i64, role_id: i64) -> Result<bool> {
        let existing = UserRoles::find()
            .filter(user_roles::Column::UserId.eq(user_id))
            .filter(user_roles::Column::RoleId.eq(role_id))
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询用户角色失败: {e}")))?;

        if existing.is_some() {
            return Ok(false);
        }

        insert_user_role(&self.db, user_id, role_id, chrono::Utc::now().timestamp()).await?;
        Ok(true)
    }

    /// 撤销用户角色
    pub async fn revoke_role_from_user_impl(&self, user_id: i64, role_id: i64) -> Result<bool> {
        let result = UserRoles::delete_many()
            .filter(user_roles::Column::UserId.eq(user_id))
            .filter(user_roles::Column::RoleId.eq(role_id))
            .exec(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("撤销用户角色失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

/// 用户名/邮箱唯一约束冲突映射为 Conflict
fn user_write_error(e: DbErr, action: &str) -> TutorHubError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            TutorHubError::conflict(format!("Username or email already exists: {detail}"))
        }
        _ => TutorHubError::database_operation(format!("{action}: {e}")),
    }
}

async fn insert_user_role<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    role_id: i64,
    now: i64,
) -> Result<()> {
    UserRoleActiveModel {
        user_id: Set(user_id),
        role_id: Set(role_id),
        assigned_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(|e| TutorHubError::database_operation(format!("分配用户角色失败: {e}")))?;

    Ok(())
}

// 供其他存储测试使用
#[cfg(test)]
pub(crate) fn new_user_request(username: &str) -> CreateUserRequest {
    CreateUserRequest {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "hashed".to_string(),
        first_name: None,
        last_name: None,
        phone: None,
        role_ids: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    #[tokio::test]
    async fn test_create_user_defaults_to_student() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let user = storage.create_user(new_user_request("alice")).await.unwrap();

        assert_eq!(user.roles, vec!["student".to_string()]);
        assert!(user.has_permission("courses.read"));
        assert!(!user.has_permission("users.manage"));
        assert_eq!(user.status, UserStatus::Active);
    }

    #[tokio::test]
    async fn test_create_user_with_unknown_role_rolls_back() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let mut req = new_user_request("bob");
        req.role_ids = Some(vec![9999]);

        assert!(storage.create_user(req).await.is_err());
        assert_eq!(storage.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_a_conflict() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        storage.create_user(new_user_request("dana")).await.unwrap();

        let err = storage
            .create_user(new_user_request("dana"))
            .await
            .unwrap_err();
        assert!(matches!(err, TutorHubError::Conflict(_)), "{err:?}");
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_user_but_keeps_name_taken() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let user = storage.create_user(new_user_request("carol")).await.unwrap();

        assert!(storage.delete_user(user.id).await.unwrap());
        assert!(!storage.delete_user(user.id).await.unwrap());
        assert!(storage.get_user_by_id(user.id).await.unwrap().is_none());
        assert!(storage.is_username_taken("carol", None).await.unwrap());
        assert!(!storage.is_username_taken("carol", Some(user.id)).await.unwrap());
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_users_filters_and_pages() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let tutor = storage
            .get_role_by_name("tutor")
            .await
            .unwrap()
            .unwrap();

        for name in ["user_a", "user_b", "user_c"] {
            storage.create_user(new_user_request(name)).await.unwrap();
        }
        let mut req = new_user_request("tutor_t");
        req.role_ids = Some(vec![tutor.id]);
        storage.create_user(req).await.unwrap();

        let page = storage
            .list_users_with_pagination(UserListQuery {
                page: 2,
                page_size: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 4);
        assert_eq!(page.items.len(), 2);
        assert!(!page.pagination.has_next);

        let tutors = storage
            .list_users_with_pagination(UserListQuery {
                page: 1,
                page_size: 10,
                role: Some("tutor".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(tutors.items.len(), 1);
        assert_eq!(tutors.items[0].username, "tutor_t");

        // `_` 是字面量，不作为通配符
        let searched = storage
            .list_users_with_pagination(UserListQuery {
                page: 1,
                page_size: 10,
                search: Some("_a".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(searched.items.len(), 1);
        assert_eq!(searched.items[0].username, "user_a");
    }

    #[tokio::test]
    async fn test_assign_role_is_idempotent() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let user = storage.create_user(new_user_request("dave")).await.unwrap();
        let parent = storage.get_role_by_name("parent").await.unwrap().unwrap();

        assert!(storage.assign_role_to_user(user.id, parent.id).await.unwrap());
        assert!(!storage.assign_role_to_user(user.id, parent.id).await.unwrap());

        let roles = storage.list_user_roles(user.id).await.unwrap();
        let names: Vec<_> = roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["parent", "student"]);

        assert!(storage.revoke_role_from_user(user.id, parent.id).await.unwrap());
        assert!(!storage.revoke_role_from_user(user.id, parent.id).await.unwrap());
    }
}
