//! 文件上传存储操作

use super::SeaOrmStorage;
use crate::entity::file_uploads::{ActiveModel, Column, Entity as FileUploads};
use crate::errors::{Result, TutorHubError};
use crate::models::{
    PaginatedResponse,
    files::{
        entities::{FileKind, FileTarget, FileUpload, NewFileUpload},
        requests::FileListQuery,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

/// 文件类型对应的目标列
fn target_column(kind: FileKind) -> Column {
    match kind {
        FileKind::CourseImage => Column::CourseId,
        FileKind::CategoryImage => Column::CategoryId,
        FileKind::UserAvatar => Column::UserId,
    }
}

impl SeaOrmStorage {
    /// 记录上传文件
    pub async fn create_file_upload_impl(&self, file: NewFileUpload) -> Result<FileUpload> {
        let (course_id, category_id, user_id) = match file.target {
            FileTarget::CourseImage { course_id } => (Some(course_id), None, None),
            FileTarget::CategoryImage { category_id } => (None, Some(category_id), None),
            FileTarget::UserAvatar { user_id } => (None, None, Some(user_id)),
        };

        let model = ActiveModel {
            kind: Set(file.target.kind().to_string()),
            file_path: Set(file.file_path),
            stored_name: Set(file.stored_name),
            original_name: Set(file.original_name),
            content_type: Set(file.content_type),
            file_size: Set(file.file_size),
            uploaded_by: Set(file.uploaded_by),
            course_id: Set(course_id),
            category_id: Set(category_id),
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("记录文件失败: {e}")))?;

        result
            .into_file_upload()
            .ok_or_else(|| TutorHubError::database_operation("文件记录缺少目标"))
    }

    pub async fn get_file_upload_by_id_impl(&self, id: i64) -> Result<Option<FileUpload>> {
        let result = FileUploads::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询文件失败: {e}")))?;

        Ok(result.and_then(|m| m.into_file_upload()))
    }

    /// 分页列出文件
    pub async fn list_file_uploads_with_pagination_impl(
        &self,
        query: FileListQuery,
    ) -> Result<PaginatedResponse<FileUpload>> {
        let page = query.page.max(1) as u64;
        let size = query.page_size.clamp(1, 100) as u64;

        let mut select = FileUploads::find();

        if let Some(kind) = query.kind {
            select = select.filter(Column::Kind.eq(kind.as_str()));
        }

        if let Some(target_id) = query.target_id {
            select = match query.kind {
                Some(kind) => select.filter(target_column(kind).eq(target_id)),
                None => select.filter(
                    Condition::any()
                        .add(Column::CourseId.eq(target_id))
                        .add(Column::CategoryId.eq(target_id))
                        .add(Column::UserId.eq(target_id)),
                ),
            };
        }

        if let Some(uploaded_by) = query.uploaded_by {
            select = select.filter(Column::UploadedBy.eq(uploaded_by));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询文件总数失败: {e}")))?;

        let files = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询文件列表失败: {e}")))?;

        Ok(PaginatedResponse::new(
            files
                .into_iter()
                .filter_map(|m| m.into_file_upload())
                .collect(),
            page as i64,
            size as i64,
            total as i64,
        ))
    }

    /// 用户当前的头像记录
    pub async fn list_user_avatars_impl(&self, user_id: i64) -> Result<Vec<FileUpload>> {
        let result = FileUploads::find()
            .filter(Column::Kind.eq(FileKind::UserAvatar.as_str()))
            .filter(Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询头像失败: {e}")))?;

        Ok(result
            .into_iter()
            .filter_map(|m| m.into_file_upload())
            .collect())
    }

    pub async fn delete_file_upload_impl(&self, id: i64) -> Result<bool> {
        let result = FileUploads::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("删除文件记录失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::users::new_user_request;

    fn avatar(user_id: i64, name: &str) -> NewFileUpload {
        NewFileUpload {
            target: FileTarget::UserAvatar { user_id },
            file_path: format!("https://cdn.example.com/{name}"),
            stored_name: None,
            original_name: name.to_string(),
            content_type: "image/png".into(),
            file_size: 128,
            uploaded_by: Some(user_id),
        }
    }

    #[tokio::test]
    async fn test_file_target_round_trip_and_filters() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let user = storage.create_user(new_user_request("gina")).await.unwrap();

        let file = storage.create_file_upload(avatar(user.id, "a.png")).await.unwrap();
        assert_eq!(file.target(), FileTarget::UserAvatar { user_id: user.id });
        assert!(!file.is_local());

        let avatars = storage.list_user_avatars(user.id).await.unwrap();
        assert_eq!(avatars.len(), 1);

        let by_kind = storage
            .list_file_uploads_with_pagination(FileListQuery {
                page: 1,
                page_size: 10,
                kind: Some(FileKind::CourseImage),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_kind.pagination.total, 0);

        let by_target = storage
            .list_file_uploads_with_pagination(FileListQuery {
                page: 1,
                page_size: 10,
                target_id: Some(user.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_target.items.len(), 1);

        assert!(storage.delete_file_upload(file.id).await.unwrap());
        assert!(storage.get_file_upload_by_id(file.id).await.unwrap().is_none());
    }
}
