use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FileService;
use crate::middlewares::RequireJWT;
use crate::models::files::requests::{FileListParams, FileListQuery};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{internal_error, unauthorized};

pub async fn list_files(
    service: &FileService,
    params: FileListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized(request));
    };
    let storage = service.get_storage(request)?;

    let query = FileListQuery {
        page: params.pagination.page(),
        page_size: params.pagination.page_size(),
        kind: params.kind,
        target_id: params.target_id,
        uploaded_by: (!user.is_admin()).then_some(user.id),
    };

    match storage.list_file_uploads_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(response, "File list retrieved successfully").at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to retrieve file list: {e}"),
        )),
    }
}
