use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::get::load_file;
use super::{FileService, can_manage_target, remove_local_file};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{forbidden, internal_error, not_found, unauthorized};

pub async fn delete_file(
    service: &FileService,
    file_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized(request));
    };
    let storage = service.get_storage(request)?;

    let file = match load_file(&storage, file_id, request).await {
        Ok(file) => file,
        Err(response) => return Ok(response),
    };

    // 上传者本人始终可以删除自己的文件
    let allowed = file.uploaded_by == Some(user.id)
        || match can_manage_target(&storage, file.target(), &user).await {
            Ok(allowed) => allowed,
            Err(e) => {
                return Ok(internal_error(
                    request,
                    ErrorCode::InternalServerError,
                    format!("Failed to check file permission: {e}"),
                ));
            }
        };
    if !allowed {
        return Ok(forbidden(request));
    }

    match storage.delete_file_upload(file_id).await {
        Ok(true) => {
            if let Some(stored_name) = &file.stored_name {
                remove_local_file(stored_name);
            }
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success_empty("File deleted successfully").at(request)))
        }
        Ok(false) => Ok(not_found(request, ErrorCode::FileNotFound, "File not found")),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("File deletion failed: {e}"),
        )),
    }
}
