use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::FileService;
use crate::models::files::entities::FileUpload;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{internal_error, not_found};
use crate::storage::Storage;

pub(crate) async fn load_file(
    storage: &Arc<dyn Storage>,
    file_id: i64,
    request: &HttpRequest,
) -> Result<FileUpload, HttpResponse> {
    match storage.get_file_upload_by_id(file_id).await {
        Ok(Some(file)) => Ok(file),
        Ok(None) => Err(not_found(request, ErrorCode::FileNotFound, "File not found")),
        Err(e) => Err(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("File query failed: {e}"),
        )),
    }
}

pub async fn get_file(
    service: &FileService,
    file_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match load_file(&storage, file_id, request).await {
        Ok(file) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(file, "File retrieved successfully").at(request))),
        Err(response) => Ok(response),
    }
}
