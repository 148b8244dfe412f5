//! 文件上传实体
//!
//! 每条记录恰好关联一个目标：course_id / category_id / user_id 中与 kind 对应的列。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "file_uploads")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub kind: String,
    pub file_path: String,
    pub stored_name: Option<String>,
    pub original_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub uploaded_by: Option<i64>,
    pub course_id: Option<i64>,
    pub category_id: Option<i64>,
    pub user_id: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UploadedBy",
        to = "super::users::Column::Id"
    )]
    Uploader,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Uploader.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 转换为业务模型；kind 无法识别或目标列缺失时返回 None
    pub fn into_file_upload(self) -> Option<crate::models::files::entities::FileUpload> {
        use crate::models::files::entities::{FileKind, FileUpload};

        let kind = self.kind.parse::<FileKind>().ok()?;
        let target_id = match kind {
            FileKind::CourseImage => self.course_id,
            FileKind::CategoryImage => self.category_id,
            FileKind::UserAvatar => self.user_id,
        }?;

        Some(FileUpload {
            id: self.id,
            kind,
            target_id,
            file_path: self.file_path,
            stored_name: self.stored_name,
            original_name: self.original_name,
            content_type: self.content_type,
            file_size: self.file_size,
            uploaded_by: self.uploaded_by,
            created_at: super::to_datetime(self.created_at),
        })
    }
}
