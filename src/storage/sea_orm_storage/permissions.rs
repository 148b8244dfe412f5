//! 权限存储操作

use super::SeaOrmStorage;
use crate::entity::permissions::{ActiveModel, Column};
use crate::entity::prelude::*;
use crate::entity::role_permissions;
use crate::errors::{Result, TutorHubError};
use crate::models::roles::{
    entities::Permission, requests::CreatePermissionRequest, responses::PermissionListResponse,
};
use crate::utils::like_contains;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建权限
    pub async fn create_permission_impl(&self, req: CreatePermissionRequest) -> Result<Permission> {
        let model = ActiveModel {
            code: Set(req.code),
            description: Set(req.description),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("创建权限失败: {e}")))?;

        Ok(result.into_permission())
    }

    pub async fn get_permission_by_id_impl(&self, id: i64) -> Result<Option<Permission>> {
        let result = Permissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询权限失败: {e}")))?;

        Ok(result.map(|m| m.into_permission()))
    }

    pub async fn get_permission_by_code_impl(&self, code: &str) -> Result<Option<Permission>> {
        let result = Permissions::find()
            .filter(Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询权限失败: {e}")))?;

        Ok(result.map(|m| m.into_permission()))
    }

    pub async fn get_permissions_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<Permission>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Permissions::find()
            .filter(Column::Id.is_in(ids.to_vec()))
            .order_by_asc(Column::Code)
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询权限失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_permission()).collect())
    }

    /// 分页列出权限
    pub async fn list_permissions_with_pagination_impl(
        &self,
        page: i64,
        page_size: i64,
        search: Option<String>,
    ) -> Result<PermissionListResponse> {
        let page = page.max(1) as u64;
        let size = page_size.clamp(1, 100) as u64;

        let mut select = Permissions::find();

        if let Some(ref search) = search
            && !search.trim().is_empty()
        {
            select = select.filter(Column::Code.like(like_contains(search.trim())));
        }

        let paginator = select.order_by_asc(Column::Code).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询权限总数失败: {e}")))?;

        let permissions = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询权限列表失败: {e}")))?;

        Ok(PermissionListResponse::new(
            permissions.into_iter().map(|m| m.into_permission()).collect(),
            page as i64,
            size as i64,
            total as i64,
        ))
    }

    /// 删除权限及其授权记录
    pub async fn delete_permission_impl(&self, id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("开启事务失败: {e}")))?;

        RolePermissions::delete_many()
            .filter(role_permissions::Column::PermissionId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("删除权限授权失败: {e}")))?;

        let result = Permissions::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("删除权限失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    #[tokio::test]
    async fn test_seeded_permissions_listed_in_pages() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let first = storage
            .list_permissions_with_pagination(1, 5, None)
            .await
            .unwrap();
        assert_eq!(first.pagination.total, 12);
        assert_eq!(first.items.len(), 5);
        assert!(first.pagination.has_next);

        let last = storage
            .list_permissions_with_pagination(3, 5, None)
            .await
            .unwrap();
        assert_eq!(last.items.len(), 2);
        assert!(!last.pagination.has_next);
    }

    #[tokio::test]
    async fn test_delete_permission_removes_grants() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let permission = storage
            .create_permission(CreatePermissionRequest {
                code: "reports.export".into(),
                description: None,
            })
            .await
            .unwrap();
        let admin = storage.get_role_by_name("admin").await.unwrap().unwrap();
        storage
            .assign_permissions_to_role(admin.id, &[permission.id])
            .await
            .unwrap();

        assert!(storage.delete_permission(permission.id).await.unwrap());
        let codes: Vec<String> = storage
            .list_role_permissions(admin.id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.code)
            .collect();
        assert!(!codes.contains(&"reports.export".to_string()));
    }
}
