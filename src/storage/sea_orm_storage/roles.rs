//! 角色存储操作

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::roles::{ActiveModel, Column};
use crate::entity::{role_permissions, user_roles, users};
use crate::errors::{Result, TutorHubError};
use crate::models::roles::{
    entities::{Permission, Role, RoleDeletion},
    requests::{CreateRoleRequest, UpdateRoleRequest},
    responses::RoleListResponse,
};
use crate::utils::like_contains;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建角色
    pub async fn create_role_impl(&self, req: CreateRoleRequest) -> Result<Role> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            description: Set(req.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("创建角色失败: {e}")))?;

        Ok(result.into_role())
    }

    /// 通过 ID 获取角色
    pub async fn get_role_by_id_impl(&self, id: i64) -> Result<Option<Role>> {
        let result = Roles::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询角色失败: {e}")))?;

        Ok(result.map(|m| m.into_role()))
    }

    /// 通过名称获取角色
    pub async fn get_role_by_name_impl(&self, name: &str) -> Result<Option<Role>> {
        let result = Roles::find()
            .filter(Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询角色失败: {e}")))?;

        Ok(result.map(|m| m.into_role()))
    }

    /// 分页列出角色
    pub async fn list_roles_with_pagination_impl(
        &self,
        page: i64,
        page_size: i64,
        search: Option<String>,
    ) -> Result<RoleListResponse> {
        let page = page.max(1) as u64;
        let size = page_size.clamp(1, 100) as u64;

        let mut select = Roles::find();

        if let Some(ref search) = search
            && !search.trim().is_empty()
        {
            select = select.filter(Column::Name.like(like_contains(search.trim())));
        }

        let paginator = select.order_by_asc(Column::Id).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询角色总数失败: {e}")))?;

        let roles = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询角色列表失败: {e}")))?;

        Ok(RoleListResponse::new(
            roles.into_iter().map(|m| m.into_role()).collect(),
            page as i64,
            size as i64,
            total as i64,
        ))
    }

    /// 更新角色
    pub async fn update_role_impl(&self, id: i64, update: UpdateRoleRequest) -> Result<Option<Role>> {
        if self.get_role_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("更新角色失败: {e}")))?;

        self.get_role_by_id_impl(id).await
    }

    /// 删除角色及其授权记录
    pub async fn delete_role_impl(&self, id: i64) -> Result<RoleDeletion> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("开启事务失败: {e}")))?;

        let exists = Roles::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询角色失败: {e}")))?
            .is_some();
        if !exists {
            return Ok(RoleDeletion::NotFound);
        }

        let holders = count_active_holders(&txn, id).await?;
        if holders > 0 {
            return Ok(RoleDeletion::InUse(holders));
        }

        // 软删除用户遗留的关联
        UserRoles::delete_many()
            .filter(user_roles::Column::RoleId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("删除用户角色失败: {e}")))?;

        RolePermissions::delete_many()
            .filter(role_permissions::Column::RoleId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("删除角色授权失败: {e}")))?;

        let result = Roles::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("删除角色失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(if result.rows_affected > 0 {
            RoleDeletion::Deleted
        } else {
            RoleDeletion::NotFound
        })
    }

    /// 角色拥有的权限
    pub async fn list_role_permissions_impl(&self, role_id: i64) -> Result<Vec<Permission>> {
        let rows = Permissions::find()
            .inner_join(RolePermissions)
            .filter(role_permissions::Column::RoleId.eq(role_id))
            .order_by_asc(crate::entity::permissions::Column::Code)
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询角色权限失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_permission()).collect())
    }

    /// 为角色授权，已有的授权保留不变
    pub async fn assign_permissions_to_role_impl(
        &self,
        role_id: i64,
        permission_ids: &[i64],
    ) -> Result<u64> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("开启事务失败: {e}")))?;

        let existing: Vec<i64> = RolePermissions::find()
            .filter(role_permissions::Column::RoleId.eq(role_id))
            .all(&txn)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询角色权限失败: {e}")))?
            .into_iter()
            .map(|m| m.permission_id)
            .collect();

        let mut ids = permission_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut granted = 0;
        for permission_id in ids.into_iter().filter(|id| !existing.contains(id)) {
            RolePermissionActiveModel {
                role_id: Set(role_id),
                permission_id: Set(permission_id),
                granted_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("分配权限失败: {e}")))?;
            granted += 1;
        }

        txn.commit()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(granted)
    }

    /// 撤销角色的某项权限
    pub async fn revoke_permission_from_role_impl(
        &self,
        role_id: i64,
        permission_id: i64,
    ) -> Result<bool> {
        let result = RolePermissions::delete_many()
            .filter(role_permissions::Column::RoleId.eq(role_id))
            .filter(role_permissions::Column::PermissionId.eq(permission_id))
            .exec(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("撤销权限失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

/// 未被软删除的用户中持有该角色的数量
async fn count_active_holders<C: ConnectionTrait>(conn: &C, role_id: i64) -> Result<u64> {
    UserRoles::find()
        .inner_join(Users)
        .filter(user_roles::Column::RoleId.eq(role_id))
        .filter(users::Column::DeletedAt.is_null())
        .count(conn)
        .await
        .map_err(|e| TutorHubError::database_operation(format!("统计角色用户失败: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::users::new_user_request;

    fn role_request(name: &str) -> CreateRoleRequest {
        CreateRoleRequest {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_assign_permissions_keeps_existing_rows() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let role = storage.create_role(role_request("librarian")).await.unwrap();
        assert!(!role.is_system);

        let read = storage
            .get_permission_by_code("courses.read")
            .await
            .unwrap()
            .unwrap();
        let manage = storage
            .get_permission_by_code("courses.manage")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            storage
                .assign_permissions_to_role(role.id, &[read.id])
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            storage
                .assign_permissions_to_role(role.id, &[read.id, manage.id, manage.id])
                .await
                .unwrap(),
            1
        );
        assert_eq!(storage.list_role_permissions(role.id).await.unwrap().len(), 2);

        assert!(
            storage
                .revoke_permission_from_role(role.id, read.id)
                .await
                .unwrap()
        );
        assert!(
            !storage
                .revoke_permission_from_role(role.id, read.id)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_role_usage_count() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let role = storage.create_role(role_request("mentor")).await.unwrap();
        assert_eq!(count_active_holders(&storage.db, role.id).await.unwrap(), 0);

        let mut req = new_user_request("erin");
        req.role_ids = Some(vec![role.id]);
        storage.create_user(req).await.unwrap();
        assert_eq!(count_active_holders(&storage.db, role.id).await.unwrap(), 1);
        assert_eq!(
            storage.delete_role(role.id).await.unwrap(),
            RoleDeletion::InUse(1)
        );
    }

    #[tokio::test]
    async fn test_role_held_only_by_deleted_users_can_be_deleted() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let role = storage.create_role(role_request("mentor")).await.unwrap();

        let mut req = new_user_request("frank");
        req.role_ids = Some(vec![role.id]);
        let user = storage.create_user(req).await.unwrap();
        assert!(storage.delete_user(user.id).await.unwrap());

        assert_eq!(count_active_holders(&storage.db, role.id).await.unwrap(), 0);
        assert_eq!(
            storage.delete_role(role.id).await.unwrap(),
            RoleDeletion::Deleted
        );
        assert!(storage.get_role_by_id(role.id).await.unwrap().is_none());
        assert_eq!(
            storage.delete_role(role.id).await.unwrap(),
            RoleDeletion::NotFound
        );
    }

    #[tokio::test]
    async fn test_delete_role_removes_grants() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let role = storage.create_role(role_request("auditor")).await.unwrap();
        let read = storage
            .get_permission_by_code("users.read")
            .await
            .unwrap()
            .unwrap();
        storage
            .assign_permissions_to_role(role.id, &[read.id])
            .await
            .unwrap();

        assert_eq!(
            storage.delete_role(role.id).await.unwrap(),
            RoleDeletion::Deleted
        );
        assert!(storage.get_role_by_id(role.id).await.unwrap().is_none());
        assert!(storage.list_role_permissions(role.id).await.unwrap().is_empty());
    }
}
