pub mod delete;
pub mod download;
pub mod get;
pub mod list;
pub mod register;
pub mod upload;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::path::Path;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::TutorHubError;
use crate::models::ErrorCode;
use crate::models::files::entities::{FileTarget, FileUpload, NewFileUpload};
use crate::models::files::requests::{FileListParams, RegisterFileRequest};
use crate::models::roles::entities::ROLE_TUTOR;
use crate::models::users::entities::User;
use crate::services::common::{forbidden, internal_error, not_found};
use crate::storage::Storage;

pub struct FileService {
    storage: Option<Arc<dyn Storage>>,
}

impl FileService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::common::storage_from(request),
        }
    }

    // 上传图片
    pub async fn handle_upload(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        upload::handle_upload(self, request, payload).await
    }

    // 登记外部文件
    pub async fn register_file(
        &self,
        body: RegisterFileRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        register::register_file(self, body, request).await
    }

    pub async fn list_files(
        &self,
        query: FileListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_files(self, query, request).await
    }

    pub async fn get_file(&self, file_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_file(self, file_id, request).await
    }

    pub async fn handle_download(
        &self,
        file_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        download::handle_download(self, file_id, request).await
    }

    pub async fn delete_file(
        &self,
        file_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_file(self, file_id, request).await
    }
}

/// 用户能否为该目标上传或删除文件
///
/// - 头像：本人或管理员
/// - 课程图片：管理员或课程所属导师
/// - 分类图片：仅管理员
pub(crate) async fn can_manage_target(
    storage: &Arc<dyn Storage>,
    target: FileTarget,
    user: &User,
) -> crate::errors::Result<bool> {
    if user.is_admin() {
        return Ok(true);
    }
    match target {
        FileTarget::UserAvatar { user_id } => Ok(user_id == user.id),
        FileTarget::CourseImage { course_id } => {
            if !user.has_role(ROLE_TUTOR) {
                return Ok(false);
            }
            Ok(storage
                .get_course_by_id(course_id)
                .await?
                .is_some_and(|course| course.is_owned_by(user.id)))
        }
        FileTarget::CategoryImage { .. } => Ok(false),
    }
}

/// 检查文件目标是否存在
pub(crate) async fn target_exists(
    storage: &Arc<dyn Storage>,
    target: FileTarget,
) -> crate::errors::Result<bool> {
    Ok(match target {
        FileTarget::UserAvatar { user_id } => storage.get_user_by_id(user_id).await?.is_some(),
        FileTarget::CourseImage { course_id } => {
            storage.get_course_by_id(course_id).await?.is_some()
        }
        FileTarget::CategoryImage { category_id } => {
            storage.get_category_by_id(category_id).await?.is_some()
        }
    })
}

/// 校验目标存在且当前用户有权操作，失败时返回对应响应
pub(crate) async fn authorize_target(
    storage: &Arc<dyn Storage>,
    target: FileTarget,
    user: &User,
    request: &HttpRequest,
) -> Result<(), HttpResponse> {
    match target_exists(storage, target).await {
        Ok(true) => {}
        Ok(false) => {
            return Err(not_found(
                request,
                ErrorCode::FileTargetNotFound,
                format!("Target {} {} not found", target.kind(), target.target_id()),
            ));
        }
        Err(e) => {
            return Err(internal_error(
                request,
                ErrorCode::InternalServerError,
                format!("Failed to check file target: {e}"),
            ));
        }
    }

    match can_manage_target(storage, target, user).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(forbidden(request)),
        Err(e) => Err(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to check file permission: {e}"),
        )),
    }
}

/// 保存文件记录；头像会替换该用户之前的头像
pub(crate) async fn save_file_record(
    storage: &Arc<dyn Storage>,
    file: NewFileUpload,
) -> crate::errors::Result<FileUpload> {
    let target = file.target;
    let saved = storage.create_file_upload(file).await?;

    if let FileTarget::UserAvatar { user_id } = target {
        for old in storage.list_user_avatars(user_id).await? {
            if old.id == saved.id {
                continue;
            }
            storage.delete_file_upload(old.id).await?;
            if let Some(stored_name) = &old.stored_name {
                remove_local_file(stored_name);
            }
        }
    }

    Ok(saved)
}

/// 本地文件的磁盘路径
pub(crate) fn local_path(stored_name: &str) -> std::path::PathBuf {
    Path::new(&AppConfig::get().upload.dir).join(stored_name)
}

/// 文件对外访问地址
pub(crate) fn public_url(stored_name: &str) -> String {
    format!(
        "{}/{}",
        AppConfig::get().upload.public_base_url.trim_end_matches('/'),
        stored_name
    )
}

/// 删除本地文件，文件已不存在时忽略
pub(crate) fn remove_local_file(stored_name: &str) {
    let path = local_path(stored_name);
    if let Err(e) = std::fs::remove_file(&path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!(
            "{}",
            TutorHubError::file_operation(format!("删除文件 {} 失败: {e}", path.display()))
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_joins_base_and_name() {
        let url = public_url("1700000000-abc.png");
        assert!(url.ends_with("/1700000000-abc.png"));
        assert!(!url.contains("//1700000000"));
        assert!(url.starts_with("http"));
    }
}
